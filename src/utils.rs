/// Bit index used for key lengths of 64 code points or more.
pub const CAP_BIT: u32 = 63;

/// Maps a key length (in code points, `>= 1`) to its bit in a length mask.
///
/// - length 1 ⇒ bit 0
/// - length 63 ⇒ bit 62
/// - length ≥ 64 ⇒ bit 63 (the CAP bit)
#[inline]
pub fn length_bit(len: usize) -> u64 {
    debug_assert!(len >= 1, "key length must be at least 1");
    if len >= 64 {
        1u64 << CAP_BIT
    } else {
        1u64 << (len - 1)
    }
}

/// Iterates viable key lengths in **descending order** using a length bitmask,
/// stopping early if the callback returns `true`.
///
/// # Parameters
/// - `mask`: lengths present for the current starter (see [`length_bit`]).
/// - `cap_here`: effective cap at the current position, usually
///   `min(longest_key, remaining_chars)`.
/// - `f(len)`: invoked for each candidate length, longest first.
///
/// # CAP semantics
/// - `cap_here == 64`: the CAP bit represents exactly length 64.
/// - `cap_here > 64`: the CAP bit only says "some length ≥ 64 exists", so every
///   length from `cap_here` down to 64 is tried.
/// - `cap_here < 64`: the CAP bit is ignored.
///
/// # Example
/// ```
/// use opencc_chain::utils::for_each_len_dec;
///
/// // bit 0 (len=1), bit 2 (len=3), CAP (≥64)
/// let mask = (1u64 << 0) | (1u64 << 2) | (1u64 << 63);
///
/// let mut seen = Vec::new();
/// for_each_len_dec(mask, 5, |len| { seen.push(len); false });
/// assert_eq!(seen, vec![3, 1]); // CAP ignored since cap_here=5 < 64
/// ```
#[inline(always)]
pub fn for_each_len_dec(mask: u64, cap_here: usize, mut f: impl FnMut(usize) -> bool) {
    if mask == 0 || cap_here == 0 {
        return;
    }
    let cap_flag = 1u64 << CAP_BIT;
    if cap_here > 64 && (mask & cap_flag) != 0 {
        for len in (65..=cap_here).rev() {
            if f(len) {
                return;
            }
        }
        if f(64) {
            return;
        }
    }

    let limit = cap_here.min(64);
    // Bits for lengths [1..=limit]; `1 << 64` would wrap to `1 << 0`.
    let range_mask = if limit >= 64 {
        !0u64
    } else {
        (1u64 << limit) - 1
    };
    let mut m = mask & range_mask & if cap_here > 64 { !cap_flag } else { !0 };
    while m != 0 {
        let bit_pos = 63 - m.leading_zeros() as usize;
        if f(bit_pos + 1) {
            return;
        }
        m &= !(1u64 << bit_pos);
    }
}

/// Length in bytes of the UTF-8 sequence introduced by `lead`.
///
/// Continuation bytes and invalid lead bytes report `1`, so a scanner always
/// makes progress; callers working on `&str` never see them at a char
/// boundary.
///
/// ```
/// use opencc_chain::utils::utf8_char_len;
/// assert_eq!(utf8_char_len(b'a'), 1);
/// assert_eq!(utf8_char_len("é".as_bytes()[0]), 2);
/// assert_eq!(utf8_char_len("汉".as_bytes()[0]), 3);
/// assert_eq!(utf8_char_len("𬴂".as_bytes()[0]), 4);
/// ```
#[inline]
pub fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_dec_visits_set_bits_longest_first() {
        let mask = length_bit(1) | length_bit(2) | length_bit(4);
        let mut seen = Vec::new();
        for_each_len_dec(mask, 16, |len| {
            seen.push(len);
            false
        });
        assert_eq!(seen, vec![4, 2, 1]);
    }

    #[test]
    fn len_dec_respects_cap_and_early_stop() {
        let mask = length_bit(1) | length_bit(3) | length_bit(5);
        let mut seen = Vec::new();
        for_each_len_dec(mask, 4, |len| {
            seen.push(len);
            len == 3
        });
        assert_eq!(seen, vec![3]);
    }

    #[test]
    fn len_dec_expands_cap_bit() {
        let mask = length_bit(70) | length_bit(2);
        let mut seen = Vec::new();
        for_each_len_dec(mask, 66, |len| {
            seen.push(len);
            false
        });
        assert_eq!(seen, vec![66, 65, 64, 2]);
    }
}
