
use fixtures::*;

use pretty_assertions::assert_eq;
use psion_word::{ParserSettings, ProcessError, RecordType, WordParser, process_file};

fn convert(data: &[u8], settings: &ParserSettings) -> Result<String, ProcessError> {
    ensure_env_logger_initialized();
    process_file(data, "test.wrd", settings)
}

#[test]
fn test_minimal_document_converts() {
    let data = DocumentBuilder::new().run(b"x", b"BT", b"NN").build();

    let text = convert(&data, &ParserSettings::default()).unwrap();
    assert_eq!(text, "x");
}

#[test]
fn test_short_buffers_are_not_word_files() {
    for len in [0, 1, 15] {
        let data = &b"PSIONWPDATAFILE"[..len];
        let err = convert(data, &ParserSettings::default()).unwrap_err();
        assert!(matches!(err, ProcessError::BadFileType), "length {len}");
    }
}

#[test]
fn test_bad_signature() {
    let data = DocumentBuilder::new().signature(b"PSIONWPDATAFILF").build();
    let err = convert(&data, &ParserSettings::default()).unwrap_err();
    assert_eq!(err.code(), 2);
}

#[test]
fn test_signature_without_full_header() {
    let mut data = b"PSIONWPDATAFILE".to_vec();
    data.resize(39, 0);
    let err = convert(&data, &ParserSettings::default()).unwrap_err();
    assert!(matches!(err, ProcessError::BadFileType));
}

#[test]
fn test_encrypted_document() {
    let data = DocumentBuilder::new().encryption_flag(256).build();
    let err = convert(&data, &ParserSettings::default()).unwrap_err();
    assert!(matches!(err, ProcessError::BadFileEncrypted));
    assert_eq!(err.code(), 3);

    // Any other value is not an encryption marker.
    let data = DocumentBuilder::new().encryption_flag(1).build();
    assert!(convert(&data, &ParserSettings::default()).is_ok());
}

#[test]
fn test_each_missing_record_type_is_rejected() {
    for missing in RecordType::ALL {
        let data = DocumentBuilder::new().remove(missing as u16).build();
        let err = convert(&data, &ParserSettings::default()).unwrap_err();

        match err {
            ProcessError::BadFileMissingRecords { missing: ref types } => {
                assert_eq!(types, &vec![missing])
            }
            other => panic!("expected missing {missing}, got {other:?}"),
        }
    }
}

#[test]
fn test_header_only_file_is_missing_everything() {
    let data = DocumentBuilder::new()
        .remove(FILE_INFO)
        .remove(PRINTER_CONFIG)
        .remove(PRINTER_DRIVER)
        .remove(HEADER_TEXT)
        .remove(FOOTER_TEXT)
        .remove(STYLE_DEFINITION)
        .remove(EMPHASIS_DEFINITION)
        .remove(BODY_TEXT)
        .remove(BLOCK_INFO)
        .build();
    assert_eq!(data.len(), 40);

    let err = convert(&data, &ParserSettings::default()).unwrap_err();
    assert_eq!(err.code(), 9);
    assert_eq!(
        err.to_string(),
        "File did not include required records (missing: FILE INFO, PRINTER CONFIG, \
         PRINTER DRIVER INFO, HEADER TEXT, FOOTER TEXT, STYLE DEFINITION, EMPHASIS DEFINITION, \
         BODY TEXT, STYLE APPLICATION)"
    );
}

#[test]
fn test_unknown_record_type() {
    for bad_type in [0_u16, 10, 0xffff] {
        let data = DocumentBuilder::new().push(bad_type, vec![1, 2, 3]).build();
        let err = convert(&data, &ParserSettings::default()).unwrap_err();
        assert_eq!(err.code(), 8, "type {bad_type}");
    }
}

#[test]
fn test_fixed_size_records_are_validated() {
    let cases: [(u16, usize, i32); 4] = [
        (FILE_INFO, 11, 4),
        (PRINTER_CONFIG, 57, 5),
        (STYLE_DEFINITION, 28, 6),
        (EMPHASIS_DEFINITION, 80, 7),
    ];

    for (type_value, length, code) in cases {
        let data = DocumentBuilder::new()
            .set(type_value, vec![0; length])
            .build();
        let err = convert(&data, &ParserSettings::default()).unwrap_err();
        assert_eq!(err.code(), code, "record type {type_value}");
    }
}

#[test]
fn test_first_failure_wins() {
    // The bad size is hit before the unknown type further on.
    let data = DocumentBuilder::new()
        .set(FILE_INFO, vec![0; 3])
        .push(42, vec![])
        .build();
    let err = convert(&data, &ParserSettings::default()).unwrap_err();
    assert!(matches!(err, ProcessError::BadRecordLengthFileInfo { length: 3 }));
}

#[test]
fn test_trailing_bytes_shorter_than_a_record_header_are_ignored() {
    let data = DocumentBuilder::new()
        .run(b"ok", b"BT", b"NN")
        .trailing(&[9, 0, 1])
        .build();
    assert_eq!(convert(&data, &ParserSettings::default()).unwrap(), "ok");
}

#[test]
fn test_plain_text_output() {
    let data = sample_document().build();
    assert_eq!(
        convert(&data, &ParserSettings::default()).unwrap(),
        "List\nBuy milk today\nEggs\n"
    );
}

#[test]
fn test_markdown_output() {
    let data = sample_document().build();
    let settings = ParserSettings::new().markdown(true);
    assert_eq!(
        convert(&data, &settings).unwrap(),
        "# List\nBuy **milk** today\n* Eggs\n"
    );
}

#[test]
fn test_outer_text_output() {
    let data = sample_document().build();

    let plain = ParserSettings::new().include_outer_text(true);
    assert_eq!(
        convert(&data, &plain).unwrap(),
        "Shopping\n********\nList\nBuy milk today\nEggs\n\n******\nPage 1"
    );

    let markdown = ParserSettings::new().include_outer_text(true).markdown(true);
    assert_eq!(
        convert(&data, &markdown).unwrap(),
        "Shopping\n********\n# List\nBuy **milk** today\n* Eggs\n\n********\nPage 1"
    );
}

#[test]
fn test_missing_outer_text_uses_placeholders() {
    let data = DocumentBuilder::new().run(b"body", b"BT", b"NN").build();
    let settings = ParserSettings::new().include_outer_text(true);
    assert_eq!(
        convert(&data, &settings).unwrap(),
        "No header\n*********\nbody\n*********\nNo footer"
    );
}

#[test]
fn test_custom_heading_style() {
    let data = DocumentBuilder::new()
        .push(STYLE_DEFINITION, style_payload(b"T1", "Title", 0x02, 320))
        .push(STYLE_DEFINITION, style_payload(b"Q1", "Quote", 0x04, 200))
        .run(b"Big title\0", b"T1", b"NN")
        .run(b"Quoted\0", b"Q1", b"NN")
        .build();

    let settings = ParserSettings::new().markdown(true);
    assert_eq!(
        convert(&data, &settings).unwrap(),
        "### **Big title**\n*Quoted*\n"
    );
}

#[test]
fn test_later_style_definition_replaces_earlier_one() {
    let data = DocumentBuilder::new()
        .push(STYLE_DEFINITION, style_payload(b"T1", "Title", 0x02, 400))
        .push(STYLE_DEFINITION, style_payload(b"T1", "Title", 0x00, 200))
        .run(b"Plain\0", b"T1", b"NN")
        .build();

    let document = WordParser::from_buffer(data).document().unwrap();
    assert_eq!(document.styles["T1"].font_size, 200);

    let text = document.to_text(&ParserSettings::new().markdown(true));
    assert_eq!(text, "Plain\n");
}

#[test]
fn test_psion_characters_are_converted() {
    let data = DocumentBuilder::new()
        .run(&[b'1', b'0', 0xf8, b' ', 0x9c, b'5', 15, b'a', 7, b'b', 14], b"BT", b"NN")
        .build();
    assert_eq!(
        convert(&data, &ParserSettings::default()).unwrap(),
        "10° £5 a-b"
    );
}

#[test]
fn test_block_info_past_the_body_is_ignored() {
    // A single block declaring far more text than there is.
    let mut blocks = 500_u16.to_le_bytes().to_vec();
    blocks.extend_from_slice(b"HANN");
    blocks.extend_from_slice(&[0; 12]);

    let data = DocumentBuilder::new()
        .set(BODY_TEXT, b"Short\0".to_vec())
        .set(BLOCK_INFO, blocks)
        .build();

    let settings = ParserSettings::new().markdown(true);
    assert_eq!(convert(&data, &settings).unwrap(), "# Short\n");
}

#[test]
fn test_diagnostics_do_not_change_output() {
    let data = sample_document().build();
    let quiet = ParserSettings::new().markdown(true);
    let verbose = quiet.clone().show_diagnostics(true);

    assert_eq!(
        convert(&data, &quiet).unwrap(),
        convert(&data, &verbose).unwrap()
    );
}

#[test]
fn test_conversion_is_idempotent() {
    let data = sample_document().build();

    for settings in [
        ParserSettings::new(),
        ParserSettings::new().markdown(true),
        ParserSettings::new().include_outer_text(true).markdown(true),
    ] {
        let first = convert(&data, &settings).unwrap();
        let second = convert(&data, &settings).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_parser_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopping.wrd");
    sample_document().write_to(&path);

    let parser =
        WordParser::from_path(&path).unwrap().with_configuration(ParserSettings::new().markdown(true));
    assert_eq!(parser.path(), Some(path.as_path()));
    assert_eq!(parser.to_text().unwrap(), "# List\nBuy **milk** today\n* Eggs\n");
}
