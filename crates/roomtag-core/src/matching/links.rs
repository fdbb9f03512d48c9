use crate::error::SelectionError;
use crate::model::Link;

/// Pick the link a run reconciles against
///
/// With a filter, only links whose display name contains it (ignoring case)
/// are considered. The first remaining link in host enumeration order wins.
///
/// # Errors
/// `SelectionError::NotFound` if no link remains.
pub fn select_link<'a>(links: &'a [Link], name_filter: Option<&str>) -> Result<&'a Link, SelectionError> {
    let needle = name_filter.map(str::to_uppercase);

    links
        .iter()
        .find(|link| match &needle {
            Some(needle) => link.display_name.to_uppercase().contains(needle.as_str()),
            None => true,
        })
        .ok_or_else(|| SelectionError::NotFound {
            filter: name_filter.map(str::to_string),
        })
}
