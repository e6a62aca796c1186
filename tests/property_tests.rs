//! Property tests over the small parsing surfaces.

use proptest::prelude::*;

use schema2xforms::resources::{resolve_placeholder, ResourceBundle};
use schema2xforms::schema::Occurs;

proptest! {
    #[test]
    fn occurs_accepts_any_ordered_pair(min in 0u32..1000, span in 0u32..1000) {
        let max = min + span;
        let occurs = Occurs::parse(
            Some(&min.to_string()),
            Some(&max.to_string()),
        ).unwrap();
        prop_assert_eq!(occurs.min, min);
        prop_assert_eq!(occurs.max, Some(max));
        prop_assert_eq!(occurs.is_repeated(), max > 1);
    }

    #[test]
    fn occurs_rejects_inverted_pairs(max in 0u32..1000, gap in 1u32..1000) {
        let min = max + gap;
        let result = Occurs::parse(
            Some(&min.to_string()),
            Some(&max.to_string()),
        );
        prop_assert!(result.is_err());
    }

    #[test]
    fn unbounded_max_is_open_ended(min in 0u32..1000) {
        let occurs = Occurs::parse(Some(&min.to_string()), Some("unbounded")).unwrap();
        prop_assert_eq!(occurs.max, None);
        prop_assert!(occurs.is_repeated());
    }

    #[test]
    fn placeholders_resolve_through_the_bundle(
        key in "[a-z][a-z0-9_.]{0,20}",
        value in "[ -~]{0,40}",
    ) {
        let mut bundle = ResourceBundle::new();
        bundle.insert(key.clone(), value.clone());

        let reference = format!("${{{key}}}");
        prop_assert_eq!(resolve_placeholder(&reference, Some(&bundle)), value);

        let empty = ResourceBundle::new();
        prop_assert_eq!(
            resolve_placeholder(&reference, Some(&empty)),
            format!("$${key}$$")
        );
        prop_assert_eq!(resolve_placeholder(&reference, None), format!("$${key}$$"));
    }

    #[test]
    fn plain_values_pass_through(value in "[a-zA-Z0-9 ]{0,40}") {
        prop_assert_eq!(resolve_placeholder(&value, None), value.clone());
    }
}
