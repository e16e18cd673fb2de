//! Collapse raw flow records into one entry per ordered airport pair

use super::{AggregatedFlow, FlowRecord};
use crate::airport::AirportCode;
use std::collections::HashMap;

pub const MIXED_DIRECTION: &str = "mixed";

/// Sum legs and weight per `(origin, dest)`, keeping first-seen order.
///
/// Records without a usable origin or destination are dropped. Sums
/// saturate instead of overflowing.
pub fn aggregate<'a, I>(records: I) -> Vec<AggregatedFlow>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut index: HashMap<(AirportCode, AirportCode), usize> = HashMap::new();
    let mut out: Vec<AggregatedFlow> = Vec::new();

    for rec in records {
        let (Some(origin), Some(dest)) = (code_of(rec.origin.as_deref()), code_of(rec.dest.as_deref())) else {
            log::debug!("skipping flow record without endpoints: {:?}", rec);
            continue;
        };

        let legs = rec.legs;
        let weight = if rec.weight.is_finite() { rec.weight.max(0.0) } else { 0.0 };

        match index.get(&(origin.clone(), dest.clone())) {
            Some(&i) => {
                let f = &mut out[i];
                f.legs = f.legs.saturating_add(legs);
                f.weight = (f.weight + weight).min(f64::MAX);
                f.direction = merge_direction(f.direction.take(), rec.direction.as_deref());
            }
            None => {
                index.insert((origin.clone(), dest.clone()), out.len());
                let direction = merge_direction(None, rec.direction.as_deref());
                out.push(AggregatedFlow { origin, dest, legs, weight, direction });
            }
        }
    }

    out
}

/// Server direction label for a pair; rows that disagree make it "mixed".
fn merge_direction(current: Option<String>, next: Option<&str>) -> Option<String> {
    let next = next.map(str::trim).filter(|d| !d.is_empty()).map(str::to_lowercase);
    match (current, next) {
        (None, next) => next,
        (Some(cur), Some(next)) if cur != next => Some(MIXED_DIRECTION.to_string()),
        (cur, _) => cur,
    }
}

fn code_of(raw: Option<&str>) -> Option<AirportCode> {
    AirportCode::parse(raw?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(o: &str, d: &str, legs: u64, weight: f64) -> FlowRecord {
        FlowRecord {
            origin: Some(o.to_string()),
            dest: Some(d.to_string()),
            legs,
            weight,
            direction: None,
        }
    }

    #[test]
    fn sums_repeated_pairs() {
        let records = vec![
            rec("SEA", "PDX", 2, 1000.0),
            rec("sea", "pdx", 3, 250.5),
            rec("SEA", "PDX", 0, 0.0),
        ];
        let agg = aggregate(&records);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].legs, 5);
        assert!((agg[0].weight - 1250.5).abs() < 1e-9);
    }

    #[test]
    fn single_record_is_identity() {
        let records = vec![rec("GEG", "BOI", 7, 42.0)];
        let agg = aggregate(&records);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].origin.as_str(), "GEG");
        assert_eq!(agg[0].dest.as_str(), "BOI");
        assert_eq!(agg[0].legs, 7);
        assert_eq!(agg[0].weight, 42.0);
    }

    #[test]
    fn ordered_pairs_stay_distinct_in_first_seen_order() {
        let records = vec![
            rec("PDX", "SEA", 1, 1.0),
            rec("SEA", "PDX", 1, 1.0),
            rec("PDX", "SEA", 1, 1.0),
        ];
        let agg = aggregate(&records);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].origin.as_str(), "PDX");
        assert_eq!(agg[0].legs, 2);
        assert_eq!(agg[1].origin.as_str(), "SEA");
    }

    #[test]
    fn skips_records_missing_endpoints() {
        let mut missing = rec("SEA", "PDX", 1, 1.0);
        missing.dest = None;
        let mut blank = rec("SEA", "PDX", 1, 1.0);
        blank.origin = Some("  ".into());
        let records = vec![missing, blank, rec("BFI", "PAE", 1, 9.0)];
        let agg = aggregate(&records);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].origin.as_str(), "BFI");
    }

    #[test]
    fn huge_leg_counts_saturate() {
        let records = vec![rec("SEA", "PDX", u64::MAX, f64::MAX), rec("SEA", "PDX", u64::MAX, f64::MAX)];
        let agg = aggregate(&records);
        assert_eq!(agg[0].legs, u64::MAX);
        assert!(agg[0].weight.is_finite());
    }

    #[test]
    fn server_direction_is_kept_per_pair() {
        let mut a = rec("SEA", "PDX", 1, 1.0);
        a.direction = Some("Outbound".into());
        let mut b = rec("SEA", "PDX", 1, 1.0);
        b.direction = None;
        let mut c = rec("PDX", "SEA", 1, 1.0);
        c.direction = Some("inbound".into());
        let mut d = rec("PDX", "SEA", 1, 1.0);
        d.direction = Some("outbound".into());
        let agg = aggregate(&[a, b, c, d]);
        assert_eq!(agg[0].direction.as_deref(), Some("outbound"));
        assert_eq!(agg[1].direction.as_deref(), Some(MIXED_DIRECTION));
    }

    #[test]
    fn negative_weight_does_not_reduce_sum() {
        let records = vec![rec("SEA", "PDX", 1, 100.0), rec("SEA", "PDX", 1, -50.0)];
        let agg = aggregate(&records);
        assert_eq!(agg[0].weight, 100.0);
    }
}
