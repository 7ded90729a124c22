//! Availability - Disponibilità settimanale del tutor e calcolo degli slot
//!
//! La disponibilità è salvata come blob JSON sul profilo tutor: per ogni
//! giorno della settimana un flag `enabled` e una lista di fasce orarie
//! `start`/`end` in formato `HH:MM` (orari UTC). Gli slot prenotabili sono
//! derivati da qui, mai persistiti.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    /// Minuti dalla mezzanotte, None se il formato non è HH:MM
    fn parse_minutes(value: &str) -> Option<u32> {
        let (h, m) = value.split_once(':')?;
        let h: u32 = h.parse().ok()?;
        let m: u32 = m.parse().ok()?;
        if h > 23 || m > 59 {
            return None;
        }
        Some(h * 60 + m)
    }

    /// Fascia come (inizio, fine) in minuti; None se invalida o rovesciata
    pub fn as_minutes(&self) -> Option<(u32, u32)> {
        let start = Self::parse_minutes(&self.start)?;
        let end = Self::parse_minutes(&self.end)?;
        if start >= end {
            return None;
        }
        Some((start, end))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DaySchedule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub ranges: Vec<TimeRange>,
}

/// Settimana tipo del tutor; i giorni assenti nel JSON sono disabilitati
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub monday: DaySchedule,
    #[serde(default)]
    pub tuesday: DaySchedule,
    #[serde(default)]
    pub wednesday: DaySchedule,
    #[serde(default)]
    pub thursday: DaySchedule,
    #[serde(default)]
    pub friday: DaySchedule,
    #[serde(default)]
    pub saturday: DaySchedule,
    #[serde(default)]
    pub sunday: DaySchedule,
}

impl WeeklyAvailability {
    pub fn for_weekday(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// Calcola gli slot prenotabili nell'intervallo `[from, until)`.
    ///
    /// Ogni slot parte all'inizio di una fascia configurata e avanza a passi
    /// di `duration_mins`; uno slot è incluso solo se cade interamente dentro
    /// la fascia e non si sovrappone a nessun intervallo di `busy`
    /// (le sessioni non cancellate già prenotate).
    pub fn bookable_slots(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        duration_mins: u32,
        busy: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> Vec<DateTime<Utc>> {
        let mut slots = Vec::new();
        if duration_mins == 0 || from >= until {
            return slots;
        }

        let duration = Duration::minutes(duration_mins as i64);
        let mut date = from.date_naive();
        let last_date = until.date_naive();

        while date <= last_date {
            let schedule = self.for_weekday(date.weekday());
            if schedule.enabled {
                let day_start = NaiveDateTime::new(date, NaiveTime::MIN).and_utc();

                for range in &schedule.ranges {
                    let Some((start_min, end_min)) = range.as_minutes() else {
                        continue; // fascia malformata, ignorata
                    };

                    let mut cursor = start_min;
                    while cursor + duration_mins <= end_min {
                        let slot_start = day_start + Duration::minutes(cursor as i64);
                        let slot_end = slot_start + duration;

                        let in_window = slot_start >= from && slot_start < until;
                        let overlaps = busy
                            .iter()
                            .any(|(b_start, b_end)| slot_start < *b_end && *b_start < slot_end);

                        if in_window && !overlaps {
                            slots.push(slot_start);
                        }
                        cursor += duration_mins;
                    }
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        slots.sort();
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(ranges: &[(&str, &str)]) -> DaySchedule {
        DaySchedule {
            enabled: true,
            ranges: ranges
                .iter()
                .map(|(s, e)| TimeRange {
                    start: s.to_string(),
                    end: e.to_string(),
                })
                .collect(),
        }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn slots_fall_inside_configured_ranges() {
        // 2026-08-03 è un lunedì
        let weekly = WeeklyAvailability {
            monday: day(&[("09:00", "12:00"), ("14:00", "15:00")]),
            ..Default::default()
        };

        let slots = weekly.bookable_slots(
            utc(2026, 8, 3, 0, 0),
            utc(2026, 8, 4, 0, 0),
            60,
            &[],
        );

        assert_eq!(
            slots,
            vec![
                utc(2026, 8, 3, 9, 0),
                utc(2026, 8, 3, 10, 0),
                utc(2026, 8, 3, 11, 0),
                utc(2026, 8, 3, 14, 0),
            ]
        );
    }

    #[test]
    fn slot_that_would_spill_past_range_end_is_dropped() {
        let weekly = WeeklyAvailability {
            monday: day(&[("09:00", "10:30")]),
            ..Default::default()
        };

        let slots = weekly.bookable_slots(
            utc(2026, 8, 3, 0, 0),
            utc(2026, 8, 4, 0, 0),
            60,
            &[],
        );

        // 09:00-10:00 ci sta, 10:00-11:00 sforerebbe la fascia
        assert_eq!(slots, vec![utc(2026, 8, 3, 9, 0)]);
    }

    #[test]
    fn busy_intervals_mask_overlapping_slots() {
        let weekly = WeeklyAvailability {
            monday: day(&[("09:00", "12:00")]),
            ..Default::default()
        };

        let busy = vec![(utc(2026, 8, 3, 9, 30), utc(2026, 8, 3, 10, 30))];
        let slots = weekly.bookable_slots(
            utc(2026, 8, 3, 0, 0),
            utc(2026, 8, 4, 0, 0),
            60,
            &busy,
        );

        // 09:00 e 10:00 intersecano la sessione esistente, resta solo 11:00
        assert_eq!(slots, vec![utc(2026, 8, 3, 11, 0)]);
    }

    #[test]
    fn disabled_days_and_malformed_ranges_yield_nothing() {
        let weekly = WeeklyAvailability {
            monday: DaySchedule {
                enabled: false,
                ranges: vec![TimeRange {
                    start: "09:00".to_string(),
                    end: "12:00".to_string(),
                }],
            },
            tuesday: day(&[("banana", "12:00"), ("15:00", "14:00")]),
            ..Default::default()
        };

        let slots = weekly.bookable_slots(
            utc(2026, 8, 3, 0, 0),
            utc(2026, 8, 5, 0, 0),
            30,
            &[],
        );

        assert!(slots.is_empty());
    }

    #[test]
    fn window_lower_bound_excludes_past_slots() {
        let weekly = WeeklyAvailability {
            monday: day(&[("09:00", "12:00")]),
            ..Default::default()
        };

        // from a metà mattinata: gli slot precedenti non devono comparire
        let slots = weekly.bookable_slots(
            utc(2026, 8, 3, 10, 0),
            utc(2026, 8, 4, 0, 0),
            60,
            &[],
        );

        assert_eq!(slots, vec![utc(2026, 8, 3, 10, 0), utc(2026, 8, 3, 11, 0)]);
    }
}
