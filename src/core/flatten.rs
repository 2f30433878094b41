//! Flattening of buffered entries into a single transmission blob

/// Join `entries` into one blob, placing `separator` between consecutive
/// non-empty entries.
///
/// Empty entries are skipped entirely, so the output never starts or ends
/// with a separator and never contains two adjacent ones introduced by this
/// function. The separator is not checked against entry content.
///
/// # Example
///
/// ```
/// use rust_stream_logger::core::flatten;
///
/// let blob = flatten(&[b"first".to_vec(), Vec::new(), b"second".to_vec()], b'\n');
/// assert_eq!(blob, b"first\nsecond");
/// ```
pub fn flatten<T: AsRef<[u8]>>(entries: &[T], separator: u8) -> Vec<u8> {
    let (bytes, rows) = entries
        .iter()
        .map(AsRef::as_ref)
        .filter(|row| !row.is_empty())
        .fold((0usize, 0usize), |(bytes, rows), row| (bytes + row.len(), rows + 1));

    let mut flat = Vec::with_capacity(bytes + rows.saturating_sub(1));
    for row in entries.iter().map(AsRef::as_ref).filter(|row| !row.is_empty()) {
        if !flat.is_empty() {
            flat.push(separator);
        }
        flat.extend_from_slice(row);
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_empty() {
        let entries: Vec<Vec<u8>> = Vec::new();
        assert!(flatten(&entries, b'\n').is_empty());
    }

    #[test]
    fn test_flatten_single_has_no_trailing_separator() {
        assert_eq!(flatten(&[b"only"], b'\n'), b"only");
    }

    #[test]
    fn test_flatten_custom_separator() {
        let entries: [&[u8]; 3] = [b"a", b"b", b"c"];
        assert_eq!(flatten(&entries, b'|'), b"a|b|c");
    }

    #[test]
    fn test_flatten_skips_empty_slots() {
        let entries: [&[u8]; 6] = [b"", b"a", b"", b"", b"b", b""];
        assert_eq!(flatten(&entries, b','), b"a,b");
    }

    #[test]
    fn test_flatten_all_empty() {
        let entries: [&[u8]; 3] = [b"", b"", b""];
        assert!(flatten(&entries, b',').is_empty());
    }

    #[test]
    fn test_flatten_allocates_exact_output() {
        let entries = [b"abc".to_vec(), b"de".to_vec()];
        let blob = flatten(&entries, b'\n');
        assert_eq!(blob.len(), 6);
        assert_eq!(blob.capacity(), 6);
    }
}
