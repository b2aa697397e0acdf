use crate::{
    codec::{decode_ascii_str, decode_i16, decode_i64, decode_u32, decode_unicode_str},
    ClassCode, ClassEntry, FileHeader, CLASS_ENTRY_LEN, CLASS_TABLE_OFFSET,
};

/// Decodes the [`FileHeader`] from `window`, normally the first
/// [`FILE_HEADER_LEN`](crate::FILE_HEADER_LEN) bytes of a file. Bytes after the
/// class table are reserved and ignored.
///
/// # Errors
/// This function returns an error if `window` is too short for the fixed fields or
/// for the number of class table entries it declares.
pub fn decode_file_header(window: &[u8]) -> crate::Result<FileHeader> {
    if window.len() < CLASS_TABLE_OFFSET {
        return Err(crate::Error::decode(format!(
            "file header must be at least {CLASS_TABLE_OFFSET} bytes, found {}",
            window.len()
        )));
    }
    let security_code = format!("{:06}", decode_i64(&window[0..8]));
    let security_name = decode_unicode_str(&window[8..24]);
    let market = decode_ascii_str(&window[24..26]);
    let flag = decode_i16(&window[26..28]) != 0;
    let class_count = decode_u32(&window[28..32]) as usize;
    let table_end = class_count
        .checked_mul(CLASS_ENTRY_LEN)
        .and_then(|len| len.checked_add(CLASS_TABLE_OFFSET))
        .filter(|end| *end <= window.len())
        .ok_or_else(|| {
            crate::Error::decode(format!(
                "class table with {class_count} entries overruns the {}-byte file header",
                window.len()
            ))
        })?;
    let class_table = window[CLASS_TABLE_OFFSET..table_end]
        .chunks_exact(CLASS_ENTRY_LEN)
        .map(|entry| ClassEntry {
            class_code: ClassCode(decode_u32(&entry[0..4])),
            start_offset: decode_i64(&entry[4..12]),
        })
        .collect();
    Ok(FileHeader {
        security_code,
        security_name,
        market,
        flag,
        class_table,
    })
}
