use scraper::{Html, Node};

/// Turn an HTML description into plain text.
///
/// Entities are decoded, tags are dropped and `<br>` becomes a newline.
pub fn decode_description(html: &str) -> String {
    if !html.contains(['<', '&']) {
        return html.to_string();
    }

    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}
