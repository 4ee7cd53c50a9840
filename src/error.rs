//! Error type shared by construction, the positional API and cursors.

use core::fmt;

/// Failure conditions surfaced by the maps and their cursors.
///
/// A missing key is never an error; lookups and removals report it as `None`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MapError {
    /// The load factor was zero, negative, NaN or infinite.
    InvalidLoadFactor(f32),
    /// A first/last operation was attempted on an empty map.
    Empty,
    /// A cursor was advanced past its last element.
    Exhausted,
    /// `Cursor::remove` was called before `next` or twice for one element.
    IllegalState,
    /// The map was structurally modified outside the cursor since it was created.
    ConcurrentModification,
    /// A cursor was handed a map other than the one that created it.
    WrongMap,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidLoadFactor(lf) => write!(f, "illegal load factor: {lf}"),
            MapError::Empty => f.write_str("map is empty"),
            MapError::Exhausted => f.write_str("cursor has no more elements"),
            MapError::IllegalState => f.write_str("no current element to remove"),
            MapError::ConcurrentModification => {
                f.write_str("map was structurally modified during iteration")
            }
            MapError::WrongMap => f.write_str("cursor used with a map that did not create it"),
        }
    }
}

impl std::error::Error for MapError {}

#[cfg(test)]
mod tests {
    use super::MapError;

    #[test]
    fn display_names_the_condition() {
        assert_eq!(
            MapError::InvalidLoadFactor(-1.0).to_string(),
            "illegal load factor: -1"
        );
        assert_eq!(MapError::Empty.to_string(), "map is empty");
        assert!(MapError::ConcurrentModification
            .to_string()
            .contains("modified"));
        assert!(MapError::WrongMap.to_string().contains("did not create"));
    }

    #[test]
    fn usable_as_boxed_error() {
        let e: Box<dyn std::error::Error> = Box::new(MapError::Exhausted);
        assert_eq!(e.to_string(), "cursor has no more elements");
    }
}
