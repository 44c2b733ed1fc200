use crate::PlotError;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How to split the fields of the csv log
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delimiter {
    Comma,
    /// guess from the first lines of the file
    Sniff,
}

/// Headed csv log kept as text, cleaning happens per column afterwards
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_csv<P: AsRef<Path>>(fin: P, delimiter: Delimiter) -> Result<Table, PlotError> {
        let mut raw = Vec::new();
        File::open(fin.as_ref())?.read_to_end(&mut raw)?;
        let text = decode(&raw);
        let delimiter = match delimiter {
            Delimiter::Comma => b',',
            Delimiter::Sniff => sniff_delimiter(&text),
        };
        debug!(
            "reading {} with delimiter {:?}",
            fin.as_ref().display(),
            delimiter as char
        );
        Table::from_str_with(&text, delimiter)
    }

    /// parse csv text with the given field delimiter
    pub fn from_str_with(text: &str, delimiter: u8) -> Result<Table, PlotError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(Table { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// the cells of one column, missing cells of short rows are empty
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.get(idx).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// index of the first column whose name contains `needle`, ignoring case and accents
    pub fn find_column(&self, needle: &str) -> Result<usize, PlotError> {
        self.pick_column(&[needle])
            .ok_or_else(|| PlotError::ColumnNotFound {
                needle: needle.to_lowercase(),
                columns: self.headers.clone(),
            })
    }

    /// index of the first column whose name contains all the tokens
    pub fn pick_column(&self, tokens: &[&str]) -> Option<usize> {
        let tokens: Vec<String> = tokens.iter().map(|t| fold(t)).collect();
        self.headers.iter().position(|h| {
            let name = fold(h);
            tokens.iter().all(|t| name.contains(t.as_str()))
        })
    }

    pub fn header(&self, idx: usize) -> &str {
        &self.headers[idx]
    }
}

/// lowercase and drop the spanish diacritics so that "Batería" matches "bateria"
pub fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            c => c,
        })
        .collect()
}

/// utf-8 when possible, otherwise latin-1 as written by spreadsheet exports
fn decode(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

/// Picks the delimiter that splits the header and the first data line
/// into the same number of fields, else the most frequent on the header.
pub fn sniff_delimiter(text: &str) -> u8 {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = match lines.next() {
        Some(h) => h,
        None => return b',',
    };
    let count = |line: &str, d: u8| line.bytes().filter(|&b| b == d).count();
    if let Some(first) = lines.next() {
        for &d in SNIFF_CANDIDATES.iter() {
            let n = count(header, d);
            if n > 0 && n == count(first, d) {
                return d;
            }
        }
    }
    SNIFF_CANDIDATES
        .iter()
        .copied()
        .map(|d| (d, count(header, d)))
        .filter(|&(_, n)| n > 0)
        .fold(None, |best: Option<(u8, usize)>, (d, n)| match best {
            Some((_, bn)) if bn >= n => best,
            _ => Some((d, n)),
        })
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_str_with(
            "Fecha,Hora,Batería (V),Irradiancia (W/m2)\n\
             01/03/2025,10:00,\"3,95\",120\n\
             01/03/2025,10:05,3.94\n",
            b',',
        )
        .unwrap()
    }

    #[test]
    fn finds_columns_ignoring_case_and_accents() {
        let t = sample();
        assert_eq!(t.find_column("fecha").unwrap(), 0);
        assert_eq!(t.find_column("bateria").unwrap(), 2);
        assert_eq!(t.find_column("IRRADIANCIA").unwrap(), 3);
    }

    #[test]
    fn missing_column_lists_columns() {
        let t = sample();
        match t.find_column("ciclo") {
            Err(PlotError::ColumnNotFound { needle, columns }) => {
                assert_eq!(needle, "ciclo");
                assert_eq!(columns.len(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_rows_read_as_empty() {
        let t = sample();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column(3), vec!["120", ""]);
        assert_eq!(t.column(2), vec!["3,95", "3.94"]);
    }

    #[test]
    fn pick_column_needs_all_tokens() {
        let t = Table::from_str_with("Temp Aire,Hum Aire,Temp Suelo,Hum Suelo\n", b',').unwrap();
        assert_eq!(t.pick_column(&["hum", "suelo"]), Some(3));
        assert_eq!(t.pick_column(&["temp", "suelo"]), Some(2));
        assert_eq!(t.pick_column(&["hum"]), Some(1));
        assert_eq!(t.pick_column(&["presion"]), None);
        assert!(t.is_empty());
    }

    #[test]
    fn bom_is_dropped() {
        let t = Table::from_str_with("\u{feff}Ciclo,Hum\n1,50\n", b',').unwrap();
        assert_eq!(t.header(0), "Ciclo");
    }

    #[test]
    fn sniffs_semicolon_logs() {
        assert_eq!(sniff_delimiter("Hum Suelo;Temp Suelo\n45,2;18,1\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("a,b\n1,2\n"), b',');
        assert_eq!(sniff_delimiter("single\n1\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn latin1_is_decoded() {
        let raw = b"Bater\xeda\n3.9\n";
        assert_eq!(decode(raw), "Batería\n3.9\n");
    }
}
