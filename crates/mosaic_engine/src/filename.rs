use std::path::{Path, PathBuf};

use uuid::Uuid;

pub const IMAGE_PREFIX: &str = "image-";
pub const IMAGE_EXTENSION: &str = "jpg";

/// `image-<uuid-v4>.jpg`; a fresh random id per call, so concurrent
/// downloads never share a name.
pub fn unique_image_filename() -> String {
    format!("{IMAGE_PREFIX}{}.{IMAGE_EXTENSION}", Uuid::new_v4())
}

pub fn unique_image_path(dir: &Path) -> PathBuf {
    dir.join(unique_image_filename())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_follow_the_image_pattern() {
        let name = unique_image_filename();
        let id = name
            .strip_prefix(IMAGE_PREFIX)
            .and_then(|rest| rest.strip_suffix(".jpg"))
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn ten_thousand_names_never_collide() {
        let names: HashSet<String> = (0..10_000).map(|_| unique_image_filename()).collect();
        assert_eq!(names.len(), 10_000);
    }

    #[test]
    fn paths_land_in_the_output_dir() {
        let path = unique_image_path(Path::new("images"));
        assert_eq!(path.parent(), Some(Path::new("images")));
    }
}
