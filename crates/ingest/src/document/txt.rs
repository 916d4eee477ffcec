use super::PageContent;

pub fn extract_txt(bytes: &[u8]) -> Vec<PageContent> {
    // Invalid UTF-8 sequences are replaced rather than rejected.
    let text = String::from_utf8_lossy(bytes);

    vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_text() {
        let content = b"Hallo Welt!\nDies ist eine Testdatei.";
        let pages = extract_txt(content);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert!(pages[0].text.contains("Hallo Welt!"));
    }

    #[test]
    fn extract_utf8_text() {
        let content = "Übungsaufgabe: Größe & Maße".as_bytes();
        let pages = extract_txt(content);
        assert_eq!(pages[0].text, "Übungsaufgabe: Größe & Maße");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let pages = extract_txt(b"Stra\xdfe");
        assert_eq!(pages[0].text, "Stra\u{FFFD}e");
    }

    #[test]
    fn extract_empty_text() {
        let pages = extract_txt(b"");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "");
    }

    #[test]
    fn trims_whitespace() {
        let pages = extract_txt(b"  \n  Hallo  \n  ");
        assert_eq!(pages[0].text, "Hallo");
    }
}
