//! Vietnamese-aware string ordering for presentation-time sorting.
//!
//! Group names and display names are Vietnamese; code-point order puts every
//! diacritic form after "z", which is wrong for any report a hospital admin
//! reads. This implements standard Vietnamese dictionary ordering: letters
//! rank `a ă â b c d đ e ê g h i k l m n o ô ơ p q r s t u ư v x y`, and
//! equal base letters break ties on tone (ngang, huyền, hỏi, ngã, sắc,
//! nặng). Characters outside the Vietnamese alphabet keep code-point order
//! after all alphabet letters.

use std::cmp::Ordering;

/// Compare two strings in Vietnamese dictionary order (case-insensitive,
/// tone-aware). Falls back to plain string comparison as the final tiebreak
/// so the ordering is total.
pub fn compare(a: &str, b: &str) -> Ordering {
    let ka = sort_key(a);
    let kb = sort_key(b);
    ka.cmp(&kb).then_with(|| a.cmp(b))
}

/// Build a comparable key: one `(primary, tone)` pair per character.
fn sort_key(s: &str) -> Vec<(u32, u8)> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match letter_weight(c) {
            Some((rank, tone)) => (rank as u32, tone),
            // Past the alphabet: 29 letters, so anything >= 64 is safe.
            None => (64 + c as u32, 0),
        })
        .collect()
}

/// `(letter rank, tone rank)` for Vietnamese alphabet characters.
fn letter_weight(c: char) -> Option<(u8, u8)> {
    let weight = match c {
        'a' => (0, 0), 'à' => (0, 1), 'ả' => (0, 2), 'ã' => (0, 3), 'á' => (0, 4), 'ạ' => (0, 5),
        'ă' => (1, 0), 'ằ' => (1, 1), 'ẳ' => (1, 2), 'ẵ' => (1, 3), 'ắ' => (1, 4), 'ặ' => (1, 5),
        'â' => (2, 0), 'ầ' => (2, 1), 'ẩ' => (2, 2), 'ẫ' => (2, 3), 'ấ' => (2, 4), 'ậ' => (2, 5),
        'b' => (3, 0),
        'c' => (4, 0),
        'd' => (5, 0),
        'đ' => (6, 0),
        'e' => (7, 0), 'è' => (7, 1), 'ẻ' => (7, 2), 'ẽ' => (7, 3), 'é' => (7, 4), 'ẹ' => (7, 5),
        'ê' => (8, 0), 'ề' => (8, 1), 'ể' => (8, 2), 'ễ' => (8, 3), 'ế' => (8, 4), 'ệ' => (8, 5),
        'g' => (9, 0),
        'h' => (10, 0),
        'i' => (11, 0), 'ì' => (11, 1), 'ỉ' => (11, 2), 'ĩ' => (11, 3), 'í' => (11, 4), 'ị' => (11, 5),
        'k' => (12, 0),
        'l' => (13, 0),
        'm' => (14, 0),
        'n' => (15, 0),
        'o' => (16, 0), 'ò' => (16, 1), 'ỏ' => (16, 2), 'õ' => (16, 3), 'ó' => (16, 4), 'ọ' => (16, 5),
        'ô' => (17, 0), 'ồ' => (17, 1), 'ổ' => (17, 2), 'ỗ' => (17, 3), 'ố' => (17, 4), 'ộ' => (17, 5),
        'ơ' => (18, 0), 'ờ' => (18, 1), 'ở' => (18, 2), 'ỡ' => (18, 3), 'ớ' => (18, 4), 'ợ' => (18, 5),
        'p' => (19, 0),
        'q' => (20, 0),
        'r' => (21, 0),
        's' => (22, 0),
        't' => (23, 0),
        'u' => (24, 0), 'ù' => (24, 1), 'ủ' => (24, 2), 'ũ' => (24, 3), 'ú' => (24, 4), 'ụ' => (24, 5),
        'ư' => (25, 0), 'ừ' => (25, 1), 'ử' => (25, 2), 'ữ' => (25, 3), 'ứ' => (25, 4), 'ự' => (25, 5),
        'v' => (26, 0),
        'x' => (27, 0),
        'y' => (28, 0), 'ỳ' => (28, 1), 'ỷ' => (28, 2), 'ỹ' => (28, 3), 'ý' => (28, 4), 'ỵ' => (28, 5),
        _ => return None,
    };
    Some(weight)
}
