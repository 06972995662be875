//! Helpers for upstream image URLs.

/// Rewrite a listing thumbnail so it points at the first page.
///
/// Custom-cropped thumbnails are swapped for the master rendition and the
/// page index (`_p<n>`) in the file name becomes `_p0`.
pub fn first_page_thumb(url: &str) -> String {
    let url = url
        .replace("/custom-thumb/", "/img-master/")
        .replace("_custom1200", "_master1200");

    let file_start = url.rfind('/').map_or(0, |i| i + 1);
    let (dir, file) = url.split_at(file_start);
    match page_index_span(file) {
        Some((start, end)) => format!("{dir}{}0{}", &file[..start], &file[end..]),
        None => url,
    }
}

/// Byte range of the digits in the last `_p<digits>` of a file name.
fn page_index_span(file: &str) -> Option<(usize, usize)> {
    let bytes = file.as_bytes();
    let mut search_end = file.len();
    while let Some(pos) = file[..search_end].rfind("_p") {
        let start = pos + 2;
        let end = start
            + bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
        let terminated = matches!(bytes.get(end), Some(b'_') | Some(b'.') | None);
        if end > start && terminated {
            return Some((start, end));
        }
        search_end = pos;
    }
    None
}

/// Extension after the last `.` of the URL's final path segment, ignoring any
/// query or fragment.
pub fn url_suffix(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_custom_thumb_to_first_page_master() {
        let thumb = "https://i.example.net/c/250x250_80_a2/custom-thumb/img/2024/05/01/10/00/00/101_p2_custom1200.jpg";
        assert_eq!(
            first_page_thumb(thumb),
            "https://i.example.net/c/250x250_80_a2/img-master/img/2024/05/01/10/00/00/101_p0_master1200.jpg"
        );
    }

    #[test]
    fn remaps_multi_digit_page_index() {
        let thumb = "https://i.example.net/img-master/img/2024/101_p12_square1200.jpg";
        assert_eq!(
            first_page_thumb(thumb),
            "https://i.example.net/img-master/img/2024/101_p0_square1200.jpg"
        );
    }

    #[test]
    fn leaves_urls_without_page_index() {
        let thumb = "https://i.example.net/img/2024/_profile_photo.jpg";
        assert_eq!(first_page_thumb(thumb), thumb);
    }

    #[test]
    fn suffix_of_url() {
        assert_eq!(url_suffix("https://i.example.net/img/101_p0.png"), Some("png"));
        assert_eq!(url_suffix("https://i.example.net/img/101_p0.jpg?v=2"), Some("jpg"));
        assert_eq!(url_suffix("https://i.example.net/img/101"), None);
    }
}
