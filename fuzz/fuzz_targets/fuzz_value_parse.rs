#![no_main]

use libfuzzer_sys::fuzz_target;
use tblr_core::{Column, ColumnId, ColumnType, ErrorKind};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 1024 {
        return;
    }

    for kind in ColumnType::ALL {
        let Ok(column) = Column::new(kind, "F", true, ColumnId(1)) else {
            return;
        };
        match column.parse_value(text) {
            Ok(cell) => {
                // Parsed cells are of the column's own kind and valid there.
                if let Some(value) = &cell {
                    assert_eq!(value.column_type(), kind);
                    let again = column.parse_value(&value.to_string());
                    assert_eq!(again.as_ref().ok(), Some(&cell), "display form must reparse");
                }
                assert!(column.is_valid_value(&cell));
            }
            Err(e) => assert_eq!(e.kind(), ErrorKind::InvalidValue),
        }
    }
});
