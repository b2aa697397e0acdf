use crate::{
    codec::{decode_f64, decode_i64, decode_u16, decode_u32, decode_unicode_str},
    ClassCode, ClassHeader, DecodeOptions, FieldDescriptor, Row, StorageType, Value,
    FIELD_DESCRIPTORS_OFFSET, FIELD_DESCRIPTOR_LEN, VALUE_LEN,
};

/// Decodes one [`FieldDescriptor`] from the first
/// [`FIELD_DESCRIPTOR_LEN`] bytes of `window`.
///
/// Layout: `i64` code, 4-byte UTF-16LE unit, `i64` digits, 1-byte storage tag.
///
/// # Panics
/// This function panics if `window` is shorter than [`FIELD_DESCRIPTOR_LEN`].
pub fn decode_field_descriptor(window: &[u8]) -> FieldDescriptor {
    FieldDescriptor {
        code: decode_i64(&window[0..8]),
        unit: decode_unicode_str(&window[8..12]),
        digits: decode_i64(&window[12..20]),
        storage_type: StorageType::from(window[20]),
    }
}

/// Decodes a [`ClassHeader`] from `window`, the header region of a class slot.
/// The latest timestamp is converted to local time according to `options`.
///
/// # Errors
/// This function returns an error if `window` is too short to hold the fixed
/// fields and all `field_count` field descriptors it declares, or if the latest
/// timestamp is out of range.
pub fn decode_class_header(window: &[u8], options: &DecodeOptions) -> crate::Result<ClassHeader> {
    if window.len() < FIELD_DESCRIPTORS_OFFSET {
        return Err(crate::Error::decode(format!(
            "class header must be at least {FIELD_DESCRIPTORS_OFFSET} bytes, found {}",
            window.len()
        )));
    }
    let class_code = ClassCode(decode_u32(&window[0..4]));
    let field_count = decode_u32(&window[4..8]);
    let record_stride = decode_u16(&window[8..10]);
    let latest_timestamp =
        options.decode_unix_timestamp(i64::from(decode_u32(&window[10..14])))?;
    let descriptors_end = (field_count as usize)
        .checked_mul(FIELD_DESCRIPTOR_LEN)
        .and_then(|len| len.checked_add(FIELD_DESCRIPTORS_OFFSET))
        .filter(|end| *end <= window.len())
        .ok_or_else(|| {
            crate::Error::decode(format!(
                "class header of class {class_code} too short for declared field_count \
                {field_count}: {} bytes can hold at most {} field descriptors",
                window.len(),
                (window.len() - FIELD_DESCRIPTORS_OFFSET) / FIELD_DESCRIPTOR_LEN
            ))
        })?;
    let fields = window[FIELD_DESCRIPTORS_OFFSET..descriptors_end]
        .chunks_exact(FIELD_DESCRIPTOR_LEN)
        .map(decode_field_descriptor)
        .collect();
    Ok(ClassHeader {
        class_code,
        field_count,
        record_stride,
        latest_timestamp,
        fields,
    })
}

/// Decodes the rows of a class body described by `header`.
///
/// The body is walked in strides of `header.record_stride` bytes. The walk stops
/// at the first row whose leading time key is 0, the end-of-data sentinel, or when
/// fewer than a full stride of bytes remains.
///
/// # Errors
/// This function returns an error if the stride can't hold the time key and one
/// value per field, or if a timestamp field is out of range.
pub fn decode_class_body(
    header: &ClassHeader,
    body: &[u8],
    options: &DecodeOptions,
) -> crate::Result<Vec<Row>> {
    let stride = usize::from(header.record_stride);
    if stride < header.min_stride() {
        return Err(crate::Error::decode(format!(
            "record stride {stride} of class {} can't hold {} fields, needs at least {}",
            header.class_code,
            header.fields.len(),
            header.min_stride()
        )));
    }
    let mut rows = Vec::new();
    for (i, window) in body.chunks_exact(stride).enumerate() {
        let time = decode_i64(&window[..VALUE_LEN]);
        if time == 0 {
            break;
        }
        let values = header
            .fields
            .iter()
            .zip(window[VALUE_LEN..].chunks_exact(VALUE_LEN))
            .map(|(field, bytes)| {
                decode_value(field.storage_type, bytes, options).map_err(|e| match e {
                    crate::Error::Decode(msg) => crate::Error::decode(format!(
                        "{msg} in row {i}, field {} of class {}",
                        field.code, header.class_code
                    )),
                    e => e,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;
        rows.push(Row { time, values });
    }
    Ok(rows)
}

fn decode_value(
    storage_type: StorageType,
    bytes: &[u8],
    options: &DecodeOptions,
) -> crate::Result<Value> {
    Ok(match storage_type {
        StorageType::Int64 => Value::Int(decode_i64(bytes)),
        StorageType::TimestampInt64 => {
            Value::Timestamp(options.decode_unix_timestamp(decode_i64(bytes))?)
        }
        StorageType::Float64 => Value::Float(decode_f64(bytes)),
    })
}
