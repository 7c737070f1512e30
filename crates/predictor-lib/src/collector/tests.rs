//! Tests for form state, widget bounds and free-text validation

#[cfg(test)]
mod collector_tests {
    use crate::collector::{
        field_spec, parse_raw, FieldKind, InputCollector, WidgetKind, FEATURE_SCHEMA,
    };
    use crate::models::{FeatureRecord, FieldValue, FEATURE_COLUMNS, NUM_FEATURES};

    #[test]
    fn test_schema_follows_column_order() {
        let names: Vec<&str> = FEATURE_SCHEMA.iter().map(|spec| spec.name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
    }

    #[test]
    fn test_widget_mix() {
        let count = |kind: WidgetKind| FEATURE_SCHEMA.iter().filter(|s| s.widget == kind).count();
        assert_eq!(count(WidgetKind::Slider), 5);
        assert_eq!(count(WidgetKind::Number), 3);
        assert_eq!(count(WidgetKind::Choice), 5);
    }

    #[test]
    fn test_defaults_within_domain() {
        for spec in FEATURE_SCHEMA.iter() {
            assert!(spec.contains(spec.default), "{} default out of range", spec.name);
        }
    }

    #[test]
    fn test_first_collect_returns_defaults() {
        let record = InputCollector::new().collect();
        assert_eq!(record, FeatureRecord::default());
        assert_eq!(record.danceability, 0.75);
        assert_eq!(record.duration_ms, 210_000);
        assert_eq!(record.time_signature, 4);
        assert_eq!(record.chorus_hit, 40.5);
    }

    #[test]
    fn test_collect_yields_thirteen_ordered_fields() {
        let mut collector = InputCollector::new();
        collector.set("valence", 0.2).unwrap();
        collector.set("sections", 33.0).unwrap();

        let values = collector.collect().values();
        assert_eq!(values.len(), NUM_FEATURES);
        let names: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(values[7].1, FieldValue::Float(0.2));
        assert_eq!(values[11].1, FieldValue::Integer(33));
    }

    #[test]
    fn test_set_clamps_like_a_widget() {
        let mut collector = InputCollector::new();
        assert_eq!(collector.set("energy", 1.7).unwrap(), 1.0);
        assert_eq!(collector.set("loudness", -99.0).unwrap(), -60.0);
        assert_eq!(collector.set("key", 13.0).unwrap(), 11.0);
        assert_eq!(collector.set("sections", 7.6).unwrap(), 8.0);

        let record = collector.collect();
        assert_eq!(record.energy, 1.0);
        assert_eq!(record.loudness, -60.0);
        assert_eq!(record.key, 11);
        assert_eq!(record.sections, 8);
    }

    #[test]
    fn test_set_rejects_unknown_and_nan() {
        let mut collector = InputCollector::new();
        let err = collector.set("tempo", 120.0).unwrap_err();
        assert!(err.mentions("tempo"));
        assert!(collector.set("energy", f64::NAN).is_err());
        assert_eq!(collector.collect(), FeatureRecord::default());
    }

    #[test]
    fn test_boundary_values_pass_through_unchanged() {
        let low = parse_raw([
            ("danceability", "0.0"),
            ("key", "0"),
            ("duration_ms", "30000"),
            ("loudness", "-60"),
            ("time_signature", "1"),
            ("sections", "1"),
        ])
        .unwrap();
        assert_eq!(low.danceability, 0.0);
        assert_eq!(low.key, 0);
        assert_eq!(low.duration_ms, 30_000);
        assert_eq!(low.loudness, -60.0);
        assert_eq!(low.time_signature, 1);
        assert_eq!(low.sections, 1);

        let high = parse_raw([
            ("danceability", "1.0"),
            ("key", "11"),
            ("duration_ms", "1000000"),
            ("loudness", "5"),
            ("chorus_hit", "300"),
            ("sections", "50"),
        ])
        .unwrap();
        assert_eq!(high.danceability, 1.0);
        assert_eq!(high.key, 11);
        assert_eq!(high.duration_ms, 1_000_000);
        assert_eq!(high.loudness, 5.0);
        assert_eq!(high.chorus_hit, 300.0);
        assert_eq!(high.sections, 50);

        let row = high.to_row();
        assert_eq!(row.values[8], 1_000_000.0);
        assert_eq!(row.values[2], 11.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let record = parse_raw([("energy", "0.3")]).unwrap();
        assert_eq!(record.energy, 0.3);
        assert_eq!(record.key, 5);
        assert_eq!(record.is_vocal_track, 1);
    }

    #[test]
    fn test_out_of_domain_rejected() {
        let err = parse_raw([("danceability", "1.01")]).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].field, "danceability");
        assert_eq!(err.issues[0].reason, "must be between 0 and 1");

        let err = parse_raw([("duration_ms", "29999")]).unwrap_err();
        assert_eq!(err.issues[0].reason, "must be between 30000 and 1000000");
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = parse_raw([("energy", "loud"), ("loudness", "")]).unwrap_err();
        assert!(err.mentions("energy"));
        assert!(err.mentions("loudness"));
        assert!(err.to_string().contains("energy is not a number"));
        assert!(parse_raw([("valence", "NaN")]).is_err());
        assert!(parse_raw([("valence", "inf")]).is_err());
    }

    #[test]
    fn test_fractional_integer_rejected() {
        let err = parse_raw([("key", "2.5")]).unwrap_err();
        assert_eq!(err.issues[0].reason, "must be a whole number, got 2.5");
        // Integral floats are accepted for integer fields
        assert_eq!(parse_raw([("mode", "0.0")]).unwrap().mode, 0);
    }

    #[test]
    fn test_issues_reported_in_column_order() {
        let err = parse_raw([
            ("is_vocal_track", "3"),
            ("bpm", "120"),
            ("danceability", "-1"),
        ])
        .unwrap_err();
        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["danceability", "is_vocal_track", "bpm"]);
    }

    #[test]
    fn test_failed_apply_leaves_state_untouched() {
        let mut collector = InputCollector::new();
        collector.apply_raw([("energy", "0.4")]).unwrap();

        let result = collector.apply_raw([("energy", "0.9"), ("key", "12")]);
        assert!(result.is_err());
        assert_eq!(collector.collect().energy, 0.4);
    }

    #[test]
    fn test_field_spec_lookup() {
        let spec = field_spec("duration_ms").unwrap();
        assert_eq!(spec.kind, FieldKind::Integer);
        assert_eq!(spec.step, 1000.0);
        assert!(field_spec("tempo").is_none());

        assert_eq!(field_spec("time_signature").unwrap().choices(), vec![1, 2, 3, 4, 5]);
        assert_eq!(field_spec("key").unwrap().choices().len(), 12);
        assert!(field_spec("energy").unwrap().choices().is_empty());
    }
}
