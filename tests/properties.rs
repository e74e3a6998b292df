//! Property tests for the source-to-staged path mapping

use std::path::{Path, PathBuf};

use cascade::config::BuildConfig;
use cascade::Staging;
use proptest::prelude::*;

fn staging() -> Staging {
    Staging::new(
        PathBuf::from("/project/src"),
        PathBuf::from("/project/stage"),
        &BuildConfig::default(),
    )
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,11}"
}

proptest! {
    #[test]
    fn unit_path_swaps_prefix_and_extension(
        dirs in prop::collection::vec(segment(), 0..4),
        name in segment(),
    ) {
        let staging = staging();
        let mut source = PathBuf::from("/project/src");
        for dir in &dirs {
            source.push(dir);
        }
        source.push(format!("{name}.scss"));

        let staged = staging.unit_path(&source);

        prop_assert!(staged.starts_with("/project/stage"));
        prop_assert_eq!(staged.extension().unwrap(), "css");

        // the relative structure is mirrored exactly
        let rel = staged.strip_prefix("/project/stage").unwrap();
        let expected: PathBuf = dirs
            .iter()
            .collect::<PathBuf>()
            .join(format!("{name}.css"));
        prop_assert_eq!(rel, expected.as_path());
    }

    #[test]
    fn distinct_sources_map_to_distinct_units(
        a in segment(),
        b in segment(),
    ) {
        prop_assume!(a != b);
        let staging = staging();

        let unit_a = staging.unit_path(Path::new(&format!("/project/src/{a}.scss")));
        let unit_b = staging.unit_path(Path::new(&format!("/project/src/{b}.scss")));

        prop_assert_ne!(unit_a, unit_b);
    }
}
