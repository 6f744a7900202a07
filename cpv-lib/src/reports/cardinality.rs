use super::table;
use crate::Result;
use crate::backend::CardinalityRecord;
use core::fmt::Write;

/// Write cardinality records as a `METRIC`/`CARDINALITY` table, in the given order.
pub fn generate<W: Write>(records: &[CardinalityRecord], writer: &mut W) -> Result<()> {
    let rows: Vec<Vec<String>> = records.iter().map(|r| vec![r.metric.clone(), r.count.to_string()]).collect();
    table::generate(&["METRIC", "CARDINALITY"], &rows, writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let records = [
            CardinalityRecord {
                metric: "apiserver_request_total".into(),
                count: 1520,
            },
            CardinalityRecord {
                metric: "up".into(),
                count: 3,
            },
        ];

        let mut out = String::new();
        generate(&records, &mut out).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "METRIC                   CARDINALITY");
        assert_eq!(lines[1], "apiserver_request_total  1520");
        assert_eq!(lines[2], "up                       3");
    }
}
