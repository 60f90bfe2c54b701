/// Characters Windows refuses in file names.
const RESERVED_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Removes the reserved path characters from `name`, keeping everything else
/// (spacing and unicode included) in place.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !RESERVED_CHARS.contains(c))
        .collect()
}
