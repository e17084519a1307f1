use crate::description::{
    normalize_whitespace, parse_amount, parse_date, parse_option_description, parse_quantity,
};
use crate::error::ImportError;
use configuration::InvalidRowPolicy;
use core_types::{Fill, FillSide, OptionContract};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ACTIVITY_DATE: &str = "Activity Date";
const INSTRUMENT: &str = "Instrument";
const DESCRIPTION: &str = "Description";
const TRANS_CODE: &str = "Trans Code";
const QUANTITY: &str = "Quantity";
const PRICE: &str = "Price";
const AMOUNT: &str = "Amount";

/// Positions of the columns this importer reads, resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    activity_date: usize,
    instrument: usize,
    description: usize,
    trans_code: usize,
    quantity: usize,
    price: usize,
    amount: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| normalize_whitespace(h).eq_ignore_ascii_case(name))
                .ok_or(ImportError::MissingColumn(name))
        };
        Ok(Self {
            activity_date: find(ACTIVITY_DATE)?,
            instrument: find(INSTRUMENT)?,
            description: find(DESCRIPTION)?,
            trans_code: find(TRANS_CODE)?,
            quantity: find(QUANTITY)?,
            price: find(PRICE)?,
            amount: find(AMOUNT)?,
        })
    }

    fn widest(&self) -> usize {
        [
            self.activity_date,
            self.instrument,
            self.description,
            self.trans_code,
            self.quantity,
            self.price,
            self.amount,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// The result of reading one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    /// Option fills in execution order, oldest first.
    pub fills: Vec<Fill>,
    /// Rows that are not option opens/closes (stock trades, transfers, footers).
    pub ignored_rows: usize,
    /// Rows rejected under `InvalidRowPolicy::Skip`.
    pub skipped_rows: usize,
}

/// Reads a brokerage transaction export and turns its option rows into `Fill`s.
#[derive(Debug, Clone, Default)]
pub struct ExportImporter {
    policy: InvalidRowPolicy,
}

impl ExportImporter {
    pub fn new(policy: InvalidRowPolicy) -> Self {
        Self { policy }
    }

    /// Imports the export at `path`.
    pub fn import_path(&self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::Open {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Reading transaction export.");
        self.import_reader(file)
    }

    /// Imports an export from any reader. The first record must be the header row.
    pub fn import_reader<R: Read>(&self, reader: R) -> Result<ImportOutcome, ImportError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = Columns::from_headers(reader.headers()?)?;
        let mut outcome = ImportOutcome::default();

        for (index, record) in reader.records().enumerate() {
            // Header is row 1.
            let row = index + 2;
            let record = record?;

            let parsed = if record.len() <= columns.widest() {
                short_row(&record, &columns, row)
            } else {
                parse_row(&record, &columns, row)
            };

            match parsed {
                Ok(Some(fill)) => outcome.fills.push(fill),
                Ok(None) => outcome.ignored_rows += 1,
                Err(e) => match self.policy {
                    InvalidRowPolicy::Abort => return Err(e),
                    InvalidRowPolicy::Skip => {
                        tracing::warn!(row, error = %e, "Skipping invalid export row.");
                        outcome.skipped_rows += 1;
                    }
                },
            }
        }

        into_execution_order(&mut outcome.fills);

        tracing::info!(
            fills = outcome.fills.len(),
            ignored = outcome.ignored_rows,
            skipped = outcome.skipped_rows,
            "Export import complete."
        );
        Ok(outcome)
    }
}

/// Brokerage exports list the newest activity first. An export whose dates never
/// increase (a single-day export included) is reversed so same-day fills keep
/// their true sequence.
fn into_execution_order(fills: &mut [Fill]) {
    let ascending = fills
        .windows(2)
        .any(|w| w[0].executed_on < w[1].executed_on);
    let descending = fills
        .windows(2)
        .any(|w| w[0].executed_on > w[1].executed_on);

    match (ascending, descending) {
        (false, _) => fills.reverse(),
        (true, false) => {}
        (true, true) => tracing::warn!(
            "Export rows are not ordered by date; same-day fills keep their row order."
        ),
    }
}

/// A row with fewer fields than the header needs. Footers and blank lines are
/// ignored; a truncated option fill is an invalid row.
fn short_row(
    record: &StringRecord,
    columns: &Columns,
    row: usize,
) -> Result<Option<Fill>, ImportError> {
    let code = record.get(columns.trans_code).unwrap_or("");
    if FillSide::from_trans_code(code).is_err() {
        tracing::debug!(row, "Ignoring short row (likely an export footer).");
        return Ok(None);
    }
    Err(ImportError::InvalidField {
        row,
        field: "row",
        reason: format!(
            "{code} row has {} fields, expected at least {}",
            record.len(),
            columns.widest() + 1
        ),
    })
}

/// Parses one data row. `Ok(None)` means the row is not an option open/close.
fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    row: usize,
) -> Result<Option<Fill>, ImportError> {
    let field = |idx: usize| record.get(idx).unwrap_or("");

    let side = match FillSide::from_trans_code(field(columns.trans_code)) {
        Ok(side) => side,
        Err(_) => {
            tracing::trace!(row, code = field(columns.trans_code), "Not an option fill.");
            return Ok(None);
        }
    };

    let description = parse_option_description(field(columns.description)).ok_or_else(|| {
        ImportError::InvalidField {
            row,
            field: "description",
            reason: format!(
                "'{}' is not an option description",
                normalize_whitespace(field(columns.description))
            ),
        }
    })?;

    let raw_date = field(columns.activity_date);
    if raw_date.is_empty() {
        return Err(ImportError::InvalidField {
            row,
            field: "date",
            reason: "activity date is missing".to_string(),
        });
    }
    let executed_on = parse_date(raw_date).ok_or_else(|| ImportError::InvalidField {
        row,
        field: "date",
        reason: format!("'{raw_date}' is not a MM/DD/YYYY date"),
    })?;

    let quantity = parse_quantity(field(columns.quantity)).map_err(|reason| {
        ImportError::InvalidField {
            row,
            field: "quantity",
            reason,
        }
    })?;

    let price = parse_amount(field(columns.price))
        .map_err(|reason| ImportError::InvalidField {
            row,
            field: "price",
            reason,
        })?
        .ok_or_else(|| ImportError::InvalidField {
            row,
            field: "price",
            reason: "price is missing".to_string(),
        })?;

    let amount = parse_amount(field(columns.amount)).map_err(|reason| {
        ImportError::InvalidField {
            row,
            field: "amount",
            reason,
        }
    })?;

    let instrument = field(columns.instrument);
    let ticker = if instrument.is_empty() {
        description.ticker.as_str()
    } else {
        instrument
    };

    let contract = OptionContract::new(
        ticker,
        description.option_type,
        description.strike,
        description.expiration,
    )
    .map_err(|source| ImportError::Validation { row, source })?;

    Fill::new(executed_on, contract, side, price, quantity, amount)
        .map(Some)
        .map_err(|source| ImportError::Validation { row, source })
}

/// Sums the reported cash flow of every fill, i.e. the realised P&L of a fully closed book.
pub fn net_cash_flow(fills: &[Fill]) -> Decimal {
    fills.iter().map(Fill::cash_flow).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CoreError, OptionType};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const HEADER: &str = "\"Activity Date\",\"Process Date\",\"Settle Date\",\"Instrument\",\"Description\",\"Trans Code\",\"Quantity\",\"Price\",\"Amount\"\n";

    fn export(rows: &str) -> String {
        format!("{HEADER}{rows}")
    }

    #[test]
    fn reads_option_fills_and_ignores_other_rows() {
        let csv = export(concat!(
            "\"10/07/2025\",\"10/07/2025\",\"10/08/2025\",\"AMD\",\"AMD 10/17/2025 Call $170.00\",\"STC\",\"2\",\"$3.10\",\"$619.94\"\n",
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"AMD\",\"AMD 10/17/2025 Call $170.00\",\"BTO\",\"2\",\"$1.20\",\"($240.04)\"\n",
            "\"10/06/2025\",\"10/06/2025\",\"10/08/2025\",\"AAPL\",\"Apple\",\"Buy\",\"5\",\"$250.00\",\"($1,250.00)\"\n",
            "\"\",\"\",\"\",\"\",\"\",\"\",\"\",\"\",\"\"\n",
            "\"The data provided is for informational purposes only.\"\n",
        ));

        let outcome = ExportImporter::default()
            .import_reader(csv.as_bytes())
            .unwrap();

        assert_eq!(outcome.fills.len(), 2);
        assert_eq!(outcome.ignored_rows, 3);
        assert_eq!(outcome.skipped_rows, 0);

        assert_eq!(outcome.fills[0].side, FillSide::Open);
        let close = &outcome.fills[1];
        assert_eq!(close.side, FillSide::Close);
        assert_eq!(close.contract.symbol, "AMD");
        assert_eq!(close.contract.option_type, OptionType::Call);
        assert_eq!(close.price, dec!(3.10));
        assert_eq!(close.quantity, 2);
        assert_eq!(close.amount, Some(dec!(619.94)));

        assert_eq!(net_cash_flow(&outcome.fills), dec!(379.90));
    }

    #[test]
    fn handles_quoted_multiline_descriptions() {
        let csv = export(
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025\nPut $660.00\",\"BTO\",\"1\",\"$2.00\",\"($200.04)\"\n",
        );
        let outcome = ExportImporter::default()
            .import_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].contract.option_type, OptionType::Put);
        assert_eq!(outcome.fills[0].contract.strike, dec!(660.00));
    }

    #[test]
    fn abort_policy_reports_offending_field() {
        let csv = export(
            "\"\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$2.00\",\"($200.04)\"\n",
        );
        let err = ExportImporter::new(InvalidRowPolicy::Abort)
            .import_reader(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidField { row: 2, field: "date", .. }
        ));
    }

    #[test]
    fn negative_quantity_is_a_validation_error() {
        let csv = export(
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"-1\",\"$2.00\",\"($200.04)\"\n",
        );
        let err = ExportImporter::default()
            .import_reader(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Validation {
                row: 2,
                source: CoreError::Validation { field: "quantity", .. }
            }
        ));
    }

    #[test]
    fn skip_policy_counts_bad_rows() {
        let csv = export(concat!(
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"x\",\"$2.00\",\"($200.04)\"\n",
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$2.00\",\"($200.04)\"\n",
        ));
        let outcome = ExportImporter::new(InvalidRowPolicy::Skip)
            .import_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.skipped_rows, 1);
    }

    #[test]
    fn newest_first_export_is_put_in_execution_order() {
        let csv = export(concat!(
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"STC\",\"1\",\"$1.50\",\"$149.96\"\n",
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$2.00\",\"($200.04)\"\n",
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$1.00\",\"($100.04)\"\n",
        ));
        let outcome = ExportImporter::default()
            .import_reader(csv.as_bytes())
            .unwrap();

        let sequence: Vec<(FillSide, Decimal)> =
            outcome.fills.iter().map(|f| (f.side, f.price)).collect();
        assert_eq!(
            sequence,
            vec![
                (FillSide::Open, dec!(1.00)),
                (FillSide::Open, dec!(2.00)),
                (FillSide::Close, dec!(1.50)),
            ]
        );
    }

    #[test]
    fn oldest_first_export_keeps_row_order() {
        let csv = export(concat!(
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$1.00\",\"($100.04)\"\n",
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$2.00\",\"($200.04)\"\n",
            "\"10/07/2025\",\"10/07/2025\",\"10/08/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"STC\",\"2\",\"$1.50\",\"$299.96\"\n",
        ));
        let outcome = ExportImporter::default()
            .import_reader(csv.as_bytes())
            .unwrap();
        let prices: Vec<Decimal> = outcome.fills.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![dec!(1.00), dec!(2.00), dec!(1.50)]);
    }

    #[test]
    fn truncated_option_row_is_invalid() {
        // Eight fields: the Amount column is missing.
        let csv = export(
            "\"10/06/2025\",\"10/06/2025\",\"10/07/2025\",\"SPY\",\"SPY 10/10/2025 Put $660.00\",\"BTO\",\"1\",\"$2.00\"\n",
        );

        let err = ExportImporter::new(InvalidRowPolicy::Abort)
            .import_reader(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidField { row: 2, field: "row", .. }
        ));

        let outcome = ExportImporter::new(InvalidRowPolicy::Skip)
            .import_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(outcome.fills.len(), 0);
        assert_eq!(outcome.skipped_rows, 1);
        assert_eq!(outcome.ignored_rows, 0);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = ExportImporter::default()
            .import_reader("Activity Date,Instrument\n10/06/2025,SPY\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("Description")));
    }
}
