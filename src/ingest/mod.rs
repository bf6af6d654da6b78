/// CSV ingestion and record validation
/// Upstream collaborator of the detection core: turns a CSV stream into a
/// validated transaction list. Bad records are rejected with line numbers,
/// oddities (self-transfers) pass through with a warning. The core itself
/// never validates.
use crate::core::{parse_timestamp, EngineError, Transaction};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RawRecord {
    transaction_id: String,
    sender_id: String,
    receiver_id: String,
    amount: String,
    timestamp: String,
}

#[derive(Debug, Clone)]
pub struct RecordError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub accepted: Vec<Transaction>,
    pub warnings: Vec<String>,
    pub rejected: Vec<RecordError>,
}

/// Parse and validate a CSV stream with the header
/// `transaction_id,sender_id,receiver_id,amount,timestamp`.
pub fn read_transactions<R: Read>(reader: R) -> Result<ValidationReport, EngineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = ValidationReport::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (row, record) in csv_reader.deserialize::<RawRecord>().enumerate() {
        let line = row + 2; // header is line 1
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                report.rejected.push(RecordError {
                    line,
                    message: format!("unreadable record: {}", e),
                });
                continue;
            }
        };

        match validate_record(&raw, &mut seen_ids) {
            Ok(tx) => {
                if tx.is_self_transfer() {
                    let warning =
                        format!("line {}: self-transfer on account {}", line, tx.sender_id);
                    tracing::warn!("{}", warning);
                    report.warnings.push(warning);
                }
                report.accepted.push(tx);
            }
            Err(e) => {
                report.rejected.push(RecordError {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Ingested {} transactions ({} rejected, {} warnings)",
        report.accepted.len(),
        report.rejected.len(),
        report.warnings.len()
    );

    Ok(report)
}

fn validate_record(
    raw: &RawRecord,
    seen_ids: &mut HashSet<String>,
) -> Result<Transaction, EngineError> {
    if raw.transaction_id.is_empty() {
        return Err(EngineError::IngestError("missing transaction_id".into()));
    }
    if raw.sender_id.is_empty() || raw.receiver_id.is_empty() {
        return Err(EngineError::IngestError(
            "missing sender_id or receiver_id".into(),
        ));
    }
    if !seen_ids.insert(raw.transaction_id.clone()) {
        return Err(EngineError::IngestError(format!(
            "duplicate transaction_id {}",
            raw.transaction_id
        )));
    }

    let amount: f64 = raw
        .amount
        .parse()
        .map_err(|_| EngineError::InvalidAmount(raw.amount.clone()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::InvalidAmount(raw.amount.clone()));
    }

    let timestamp = parse_timestamp(&raw.timestamp)?;

    Ok(Transaction {
        transaction_id: raw.transaction_id.clone(),
        sender_id: raw.sender_id.clone(),
        receiver_id: raw.receiver_id.clone(),
        amount,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "transaction_id,sender_id,receiver_id,amount,timestamp\n";

    fn ingest(rows: &str) -> ValidationReport {
        let csv = format!("{}{}", HEADER, rows);
        read_transactions(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_clean_rows_accepted() {
        let report = ingest(
            "T1,A,B,100.50,2024-01-01 10:00:00\n\
             T2,B,C,25.00,2024-01-01 11:30:00\n",
        );
        assert_eq!(report.accepted.len(), 2);
        assert!(report.rejected.is_empty());
        assert_eq!(report.accepted[0].amount, 100.5);
        assert_eq!(report.accepted[1].sender_id, "B");
    }

    #[test]
    fn test_bad_amounts_rejected() {
        let report = ingest(
            "T1,A,B,-5,2024-01-01 10:00:00\n\
             T2,A,B,zero,2024-01-01 10:00:00\n\
             T3,A,B,0,2024-01-01 10:00:00\n",
        );
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected.len(), 3);
        assert_eq!(report.rejected[0].line, 2);
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let report = ingest("T1,A,B,10,01/01/2024\n");
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejects_later_record() {
        let report = ingest(
            "T1,A,B,10,2024-01-01 10:00:00\n\
             T1,C,D,20,2024-01-01 11:00:00\n",
        );
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].sender_id, "A");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 3);
        assert!(report.rejected[0].message.contains("duplicate"));
    }

    #[test]
    fn test_self_transfer_warns_but_passes() {
        let report = ingest("T1,A,A,10,2024-01-01 10:00:00\n");
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("self-transfer"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let report = ingest(
            ",A,B,10,2024-01-01 10:00:00\n\
             T2,,B,10,2024-01-01 10:00:00\n",
        );
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected.len(), 2);
    }
}
