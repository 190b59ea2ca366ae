/// The page the connector renders into.
///
/// Elements are addressed by id and are all optional: a missing element turns
/// the corresponding update into a no-op.
pub trait Page {
    /// Shows a blocking notification to the user.
    fn alert(&self, message: &str);

    fn has_element(&self, element_id: &str) -> bool;

    /// Replaces the element's text. Returns `false` if the element is missing.
    fn set_text(&self, element_id: &str, text: &str) -> bool;

    fn set_disabled(&self, _element_id: &str, _disabled: bool) {}
}
