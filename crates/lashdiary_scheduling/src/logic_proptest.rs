#[cfg(test)]
mod tests {
    use crate::logic::{canonical_instant, parse_time_label, SlotTime};
    use chrono::NaiveDate;
    use chrono_tz::Tz;
    use proptest::prelude::*;

    proptest! {
        // Every well-formed 12-hour label parses to the manually computed
        // 24-hour components, independent of case and spacing.
        #[test]
        fn valid_twelve_hour_labels_parse(
            hour in 1u8..=12,
            minute in 0u8..=59,
            pm in any::<bool>(),
            spaced in any::<bool>(),
            lowercase in any::<bool>(),
        ) {
            let meridiem = match (pm, lowercase) {
                (true, false) => "PM",
                (true, true) => "pm",
                (false, false) => "AM",
                (false, true) => "am",
            };
            let label = if spaced {
                format!("{hour}:{minute:02} {meridiem}")
            } else {
                format!("{hour}:{minute:02}{meridiem}")
            };

            let expected_hour = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            };

            let parsed = parse_time_label(&label).unwrap();
            prop_assert_eq!(parsed, SlotTime { hour: expected_hour, minute });
        }

        // The canonical time always renders back to the label it came from.
        #[test]
        fn canonical_labels_roundtrip(hour in 0u8..=23, minute in 0u8..=59) {
            let time = SlotTime { hour, minute };
            let parsed = parse_time_label(&time.label_12h()).unwrap();
            prop_assert_eq!(parsed, time);
        }

        // The parser rejects or accepts, but never panics, whatever the input.
        #[test]
        fn parser_never_panics(label in any::<String>()) {
            let _ = parse_time_label(&label);
        }

        // Anchoring any valid slot in the business zone yields an instant
        // with the explicit +03:00 offset (Nairobi has no DST).
        #[test]
        fn nairobi_instants_carry_the_offset(
            year in 2020i32..=2032,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u8..=23,
            minute in 0u8..=59,
        ) {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let instant =
                canonical_instant(date, SlotTime { hour, minute }, Tz::Africa__Nairobi).unwrap();
            prop_assert!(instant.to_rfc3339().ends_with("+03:00"));
        }
    }
}
