pub const PAN_CHARS: usize = 10;
pub const GSTIN_CHARS: usize = 15;

/// PAN layout: five letters, four digits, one letter. stored upper case
pub fn pan_valid(given: &str) -> bool {
    let bytes = given.as_bytes();

    if bytes.len() != PAN_CHARS {
        return false;
    }

    bytes[0..5].iter().all(|b| b.is_ascii_uppercase())
        && bytes[5..9].iter().all(|b| b.is_ascii_digit())
        && bytes[9].is_ascii_uppercase()
}

fn base36_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'A'..=b'Z' => Some((b - b'A') as u32 + 10),
        _ => None
    }
}

fn base36_char(v: u32) -> u8 {
    if v < 10 {
        b'0' + v as u8
    } else {
        b'A' + (v - 10) as u8
    }
}

/// check digit over the first fourteen characters. alternate factors of one
/// and two, sum of quotient and remainder base 36
pub fn gstin_check_digit(first14: &[u8]) -> Option<u8> {
    let mut sum = 0u32;

    for (index, b) in first14.iter().enumerate() {
        let value = base36_value(*b)?;
        let product = value * if index % 2 == 1 { 2 } else { 1 };

        sum += product / 36 + product % 36;
    }

    Some(base36_char((36 - sum % 36) % 36))
}

/// GSTIN layout: two digit state code, embedded PAN, entity code, the letter
/// Z, then the checksum character
pub fn gstin_valid(given: &str) -> bool {
    let bytes = given.as_bytes();

    if bytes.len() != GSTIN_CHARS {
        return false;
    }

    if !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return false;
    }

    let state_code = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');

    if state_code == 0 || state_code > 38 {
        return false;
    }

    if !pan_valid(std::str::from_utf8(&bytes[2..12]).unwrap()) {
        return false;
    }

    if !bytes[12].is_ascii_alphanumeric() || bytes[13] != b'Z' {
        return false;
    }

    match gstin_check_digit(&bytes[0..14]) {
        Some(expected) => expected == bytes[14],
        None => false
    }
}

/// assessment years are written "2024-25": a four digit year followed by the
/// last two digits of the year after it
pub fn assessment_year_valid(given: &str) -> bool {
    let Some((start, end)) = given.split_once('-') else {
        return false;
    };

    if start.len() != 4 || end.len() != 2 {
        return false;
    }

    let Ok(start_year) = start.parse::<u32>() else {
        return false;
    };
    let Ok(end_year) = end.parse::<u32>() else {
        return false;
    };

    start_year >= 2000 && (start_year + 1) % 100 == end_year
}

/// financial years share the assessment year layout
pub fn financial_year_valid(given: &str) -> bool {
    assessment_year_valid(given)
}

/// GST return periods are written "MM-YYYY"
pub fn period_valid(given: &str) -> bool {
    let Some((month, year)) = given.split_once('-') else {
        return false;
    };

    if month.len() != 2 || year.len() != 4 {
        return false;
    }

    let Ok(month) = month.parse::<u32>() else {
        return false;
    };
    let Ok(year) = year.parse::<u32>() else {
        return false;
    };

    (1..=12).contains(&month) && year >= 2017
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pan_layout() {
        assert!(pan_valid("ABCDE1234F"));
        assert!(!pan_valid("ABCDE1234"));
        assert!(!pan_valid("abcde1234f"));
        assert!(!pan_valid("AB1DE1234F"));
        assert!(!pan_valid("ABCDE123XF"));
    }

    #[test]
    fn gstin_checksum() {
        assert!(gstin_valid("29ABCDE1234F1ZW"));

        // single character tampered, checksum no longer matches
        assert!(!gstin_valid("29ABCDE1234F2ZW"));
        assert!(!gstin_valid("29ABCDE1234F1ZX"));
    }

    #[test]
    fn gstin_layout() {
        assert!(!gstin_valid("29ABCDE1234F1Z"));
        assert!(!gstin_valid("00ABCDE1234F1ZW"));
        assert!(!gstin_valid("99ABCDE1234F1ZW"));
        assert!(!gstin_valid("29ABCDE1234F1YW"));
    }

    #[test]
    fn assessment_years() {
        assert!(assessment_year_valid("2024-25"));
        assert!(assessment_year_valid("2099-00"));
        assert!(!assessment_year_valid("2024-26"));
        assert!(!assessment_year_valid("2024"));
        assert!(!assessment_year_valid("1999-00"));
    }

    #[test]
    fn gst_periods() {
        assert!(period_valid("04-2024"));
        assert!(period_valid("12-2017"));
        assert!(!period_valid("13-2024"));
        assert!(!period_valid("00-2024"));
        assert!(!period_valid("04-2016"));
        assert!(!period_valid("4-2024"));
    }
}
