use time::macros::datetime;

use crate::{
    encode::{class_table, FileEncoder},
    registry, ClassHeader, ClassTable, FieldDescriptor, FileHeader, Frame, Row, StorageType,
    Value,
};

pub fn field(code: i64, storage_type: StorageType) -> FieldDescriptor {
    FieldDescriptor {
        code,
        // two UTF-16 code units, so decoding doesn't append NULs
        unit: "元\0".to_owned(),
        digits: 2,
        storage_type,
    }
}

fn class_header(class_code: crate::ClassCode, fields: Vec<FieldDescriptor>) -> ClassHeader {
    ClassHeader {
        class_code,
        field_count: fields.len() as u32,
        record_stride: (crate::VALUE_LEN * (1 + fields.len())) as u16,
        latest_timestamp: datetime!(2021-01-04 07:00:00),
        fields,
    }
}

/// Daily quotes with an integer volume column and a float close column.
pub fn daily_quote_table(rows: &[(i64, i64, f64)]) -> ClassTable {
    ClassTable {
        header: class_header(
            registry::DAILY_QUOTES,
            vec![
                field(1007011, StorageType::Int64),
                field(1007009, StorageType::Float64),
            ],
        ),
        rows: rows
            .iter()
            .map(|(time, volume, close)| Row {
                time: *time,
                values: vec![Value::Int(*volume), Value::Float(*close)],
            })
            .collect(),
    }
}

/// Income statements with a single float column.
pub fn income_table(rows: &[(i64, f64)]) -> ClassTable {
    ClassTable {
        header: class_header(
            registry::INCOME_STATEMENT,
            vec![field(1001012, StorageType::Float64)],
        ),
        rows: rows
            .iter()
            .map(|(time, revenue)| Row {
                time: *time,
                values: vec![Value::Float(*revenue)],
            })
            .collect(),
    }
}

pub fn daily_quote_frame(rows: &[(i64, f64)]) -> Frame {
    let table = daily_quote_table(
        &rows
            .iter()
            .enumerate()
            .map(|(i, (volume, close))| (i as i64 + 1, *volume, *close))
            .collect::<Vec<_>>(),
    );
    Frame {
        class_code: Some(table.class_code()),
        fields: table.header.fields,
        rows: table.rows.into_iter().map(|row| row.values).collect(),
    }
}

pub fn file_header(tables: &[ClassTable]) -> FileHeader {
    FileHeader {
        security_code: "000001".to_owned(),
        security_name: "平安银行".to_owned(),
        market: "SZ".to_owned(),
        flag: false,
        class_table: class_table(tables),
    }
}

pub fn encode_file(tables: &[ClassTable]) -> Vec<u8> {
    let mut encoder = FileEncoder::new(Vec::new());
    encoder.encode(&file_header(tables), tables).unwrap();
    encoder.into_inner()
}
