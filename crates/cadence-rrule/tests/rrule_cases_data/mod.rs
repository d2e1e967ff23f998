use cadence_rrule::{Frequency, RecurrenceRule, RecurrenceRuleBuilder, Weekday};
use chrono::NaiveDateTime;
use rrule::{RRuleSet, Tz};

pub struct RRuleCase {
    pub name: &'static str,
    pub frequency: Frequency,
    pub anchor: &'static str,
    pub configure: fn(RecurrenceRuleBuilder) -> RecurrenceRuleBuilder,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: u16,
    pub after: Option<&'static str>,
    pub before: Option<&'static str>,
    /// Equivalent RRULE body for cross-checking against the `rrule` crate.
    /// `None` where the two engines legitimately differ (day clamping).
    pub oracle: Option<&'static str>,
}

const WORKDAYS: [Weekday; 5] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];

#[expect(clippy::too_many_lines)]
pub fn rrule_cases() -> Vec<RRuleCase> {
    vec![
        RRuleCase {
            name: "daily_basic",
            frequency: Frequency::Daily,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b.with_count(3),
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-02T09:00:00",
                "2020-01-03T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=DAILY;COUNT=3"),
        },
        RRuleCase {
            name: "daily_interval",
            frequency: Frequency::Daily,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b.with_interval(2).with_count(4),
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-03T09:00:00",
                "2020-01-05T09:00:00",
                "2020-01-07T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=DAILY;INTERVAL=2;COUNT=4"),
        },
        RRuleCase {
            name: "weekly_mon_wed_fri",
            frequency: Frequency::Weekly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| {
                b.with_count(6)
                    .with_by_weekday([Weekday::Monday, Weekday::Wednesday, Weekday::Friday])
            },
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-03T09:00:00",
                "2020-01-06T09:00:00",
                "2020-01-08T09:00:00",
                "2020-01-10T09:00:00",
                "2020-01-13T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=WEEKLY;COUNT=6;BYDAY=MO,WE,FR"),
        },
        RRuleCase {
            name: "weekly_mon_wed_fri_every_other_week",
            frequency: Frequency::Weekly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| {
                b.with_interval(2)
                    .with_count(6)
                    .with_by_weekday([Weekday::Monday, Weekday::Wednesday, Weekday::Friday])
            },
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-03T09:00:00",
                "2020-01-13T09:00:00",
                "2020-01-15T09:00:00",
                "2020-01-17T09:00:00",
                "2020-01-27T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=WEEKLY;INTERVAL=2;COUNT=6;BYDAY=MO,WE,FR"),
        },
        RRuleCase {
            name: "weekly_week_start_monday",
            frequency: Frequency::Weekly,
            anchor: "1997-08-05T09:00:00",
            configure: |b| {
                b.with_interval(2)
                    .with_count(4)
                    .with_by_weekday([Weekday::Tuesday, Weekday::Sunday])
            },
            expected: Some(&[
                "1997-08-05T09:00:00",
                "1997-08-10T09:00:00",
                "1997-08-19T09:00:00",
                "1997-08-24T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=MO"),
        },
        RRuleCase {
            name: "weekly_week_start_sunday",
            frequency: Frequency::Weekly,
            anchor: "1997-08-05T09:00:00",
            configure: |b| {
                b.with_interval(2)
                    .with_count(4)
                    .with_by_weekday([Weekday::Tuesday, Weekday::Sunday])
                    .with_week_start(Weekday::Sunday)
            },
            expected: Some(&[
                "1997-08-05T09:00:00",
                "1997-08-17T09:00:00",
                "1997-08-19T09:00:00",
                "1997-08-31T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=SU"),
        },
        RRuleCase {
            name: "monthly_fifteenth",
            frequency: Frequency::Monthly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b.with_count(3).with_by_month_day([15]),
            expected: Some(&[
                "2020-01-15T09:00:00",
                "2020-02-15T09:00:00",
                "2020-03-15T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=MONTHLY;COUNT=3;BYMONTHDAY=15"),
        },
        RRuleCase {
            name: "monthly_anchor_day_clamps",
            frequency: Frequency::Monthly,
            anchor: "2020-01-31T09:00:00",
            configure: |b| b.with_count(4),
            expected: Some(&[
                "2020-01-31T09:00:00",
                "2020-02-29T09:00:00",
                "2020-03-31T09:00:00",
                "2020-04-30T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: None,
        },
        RRuleCase {
            name: "monthly_explicit_thirty_first_skips",
            frequency: Frequency::Monthly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b.with_count(4).with_by_month_day([31]),
            expected: Some(&[
                "2020-01-31T09:00:00",
                "2020-03-31T09:00:00",
                "2020-05-31T09:00:00",
                "2020-07-31T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=MONTHLY;COUNT=4;BYMONTHDAY=31"),
        },
        RRuleCase {
            name: "monthly_last_friday",
            frequency: Frequency::Monthly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| {
                b.with_count(3)
                    .with_by_weekday([Weekday::Friday.nth(-1).expect("-1FR is a valid ordinal")])
            },
            expected: Some(&[
                "2020-01-31T09:00:00",
                "2020-02-28T09:00:00",
                "2020-03-27T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=MONTHLY;COUNT=3;BYDAY=-1FR"),
        },
        RRuleCase {
            name: "monthly_last_working_day",
            frequency: Frequency::Monthly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| {
                b.with_count(3)
                    .with_by_weekday(WORKDAYS)
                    .with_by_set_position([-1])
            },
            expected: Some(&[
                "2020-01-31T09:00:00",
                "2020-02-28T09:00:00",
                "2020-03-31T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1"),
        },
        RRuleCase {
            name: "yearly_leap_day_clamps",
            frequency: Frequency::Yearly,
            anchor: "2020-02-29T09:00:00",
            configure: |b| b.with_count(2),
            expected: Some(&["2020-02-29T09:00:00", "2021-02-28T09:00:00"]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: None,
        },
        RRuleCase {
            name: "yearly_fourth_thursday_of_november",
            frequency: Frequency::Yearly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| {
                b.with_count(3)
                    .with_by_month([11])
                    .with_by_weekday([Weekday::Thursday.nth(4).expect("4TH is a valid ordinal")])
            },
            expected: Some(&[
                "2020-11-26T09:00:00",
                "2021-11-25T09:00:00",
                "2022-11-24T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=YEARLY;COUNT=3;BYMONTH=11;BYDAY=4TH"),
        },
        RRuleCase {
            name: "yearly_first_and_last_day",
            frequency: Frequency::Yearly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b.with_count(4).with_by_year_day([1, -1]),
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-12-31T09:00:00",
                "2021-01-01T09:00:00",
                "2021-12-31T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=YEARLY;COUNT=4;BYYEARDAY=1,-1"),
        },
        RRuleCase {
            name: "yearly_monday_of_week_twenty",
            frequency: Frequency::Yearly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| {
                b.with_count(2)
                    .with_by_week_number([20])
                    .with_by_weekday([Weekday::Monday])
            },
            expected: Some(&["2020-05-11T09:00:00", "2021-05-17T09:00:00"]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=YEARLY;COUNT=2;BYWEEKNO=20;BYDAY=MO"),
        },
        RRuleCase {
            name: "hourly_on_the_half_hour",
            frequency: Frequency::Hourly,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b.with_count(4).with_by_minute([0, 30]),
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-01T09:30:00",
                "2020-01-01T10:00:00",
                "2020-01-01T10:30:00",
            ]),
            expected_len: None,
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=HOURLY;COUNT=4;BYMINUTE=0,30"),
        },
        RRuleCase {
            name: "weekly_until_inclusive",
            frequency: Frequency::Weekly,
            anchor: "2020-01-06T09:00:00",
            configure: |b| b.with_until(parse_naive("2020-02-03T09:00:00")),
            expected: None,
            expected_len: Some(5),
            limit: 100,
            after: None,
            before: None,
            oracle: Some("FREQ=WEEKLY;UNTIL=20200203T090000Z"),
        },
        RRuleCase {
            name: "daily_unbounded_window",
            frequency: Frequency::Daily,
            anchor: "2020-01-01T09:00:00",
            configure: |b| b,
            expected: Some(&[
                "2020-03-02T09:00:00",
                "2020-03-03T09:00:00",
                "2020-03-04T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            after: Some("2020-03-01T10:00:00"),
            before: Some("2020-03-05T08:00:00"),
            oracle: Some("FREQ=DAILY"),
        },
        RRuleCase {
            name: "secondly_limited",
            frequency: Frequency::Secondly,
            anchor: "2020-01-01T23:59:58",
            configure: |b| b,
            expected: Some(&[
                "2020-01-01T23:59:58",
                "2020-01-01T23:59:59",
                "2020-01-02T00:00:00",
            ]),
            expected_len: None,
            limit: 3,
            after: None,
            before: None,
            oracle: Some("FREQ=SECONDLY"),
        },
    ]
}

pub fn build_case(case: &RRuleCase) -> RecurrenceRule {
    let builder = RecurrenceRule::builder(case.frequency, parse_naive(case.anchor));
    (case.configure)(builder)
        .build()
        .unwrap_or_else(|err| panic!("Failed to build {}: {}", case.name, err))
}

/// Occurrences of the case's rule inside its optional inclusive window, up to
/// `limit` of them.
fn engine_window(case: &RRuleCase) -> Vec<NaiveDateTime> {
    let rule = build_case(case);
    let after = case.after.map(parse_naive);
    let before = case.before.map(parse_naive);
    rule.iter()
        .skip_while(|dt| after.is_some_and(|after| *dt < after))
        .take_while(|dt| before.is_none_or(|before| *dt <= before))
        .take(usize::from(case.limit))
        .collect()
}

pub fn assert_case(case: &RRuleCase) {
    let actual = engine_window(case);

    if let Some(expected) = case.expected {
        let expected: Vec<NaiveDateTime> = expected.iter().copied().map(parse_naive).collect();
        assert_eq!(actual, expected, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            actual.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}

/// Expands the case's RRULE equivalent with the `rrule` crate and compares it
/// with this engine's output over the same window.
pub fn assert_oracle(case: &RRuleCase) {
    let Some(body) = case.oracle else {
        return;
    };
    let dtstart = parse_naive(case.anchor).format("%Y%m%dT%H%M%SZ");
    let mut rrule_set: RRuleSet = format!("DTSTART:{dtstart}\nRRULE:{body}")
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse oracle for {}: {}", case.name, err));

    if let Some(after) = case.after {
        rrule_set = rrule_set.after(parse_naive(after).and_utc().with_timezone(&Tz::UTC));
    }
    if let Some(before) = case.before {
        rrule_set = rrule_set.before(parse_naive(before).and_utc().with_timezone(&Tz::UTC));
    }

    let expected: Vec<NaiveDateTime> = rrule_set
        .all(case.limit)
        .dates
        .iter()
        .map(chrono::DateTime::naive_utc)
        .collect();

    assert_eq!(engine_window(case), expected, "Case {} disagrees with the rrule crate", case.name);
}

fn parse_naive(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .unwrap_or_else(|err| panic!("Failed to parse timestamp {value}: {err}"))
}
