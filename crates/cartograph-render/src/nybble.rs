//! 4-bit values packed two per byte, even index in the low nibble.

#[inline]
pub fn get(arr: &[u8], index: usize) -> u8 {
    let byte = arr[index / 2];
    if index % 2 == 0 {
        byte & 0x0F
    } else {
        byte >> 4
    }
}

#[inline]
pub fn set(arr: &mut [u8], index: usize, value: u8) {
    let byte = &mut arr[index / 2];
    if index % 2 == 0 {
        *byte = (*byte & 0xF0) | (value & 0x0F);
    } else {
        *byte = (*byte & 0x0F) | ((value & 0x0F) << 4);
    }
}
