use std::error::Error;

use datatools::{
    TranscodeError,
    cli::transcode,
    config::{FieldsPerRecord, TranscoderConfig},
    core::step::{StepBuilder, StepStatus},
    item::delimited::{
        DelimitedItemReaderBuilder, DelimitedItemWriterBuilder, Encoding, QuoteStyle, Record,
        decode, encode,
    },
};

fn csv_to_tsv(input: &str) -> (String, String, StepStatus) {
    let mut output = Vec::new();
    let mut errors = Vec::new();
    let execution = transcode(
        "csv2tab",
        TranscoderConfig::csv(),
        Encoding::tsv(),
        false,
        input.as_bytes(),
        &mut output,
        &mut errors,
    )
    .unwrap();
    (
        String::from_utf8(output).unwrap(),
        String::from_utf8(errors).unwrap(),
        execution.status,
    )
}

fn tsv_to_csv(input: &str) -> String {
    let mut output = Vec::new();
    transcode(
        "tab2csv",
        TranscoderConfig::tsv(),
        Encoding::csv(),
        false,
        input.as_bytes(),
        &mut output,
        Vec::new(),
    )
    .unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn people_csv_becomes_tsv() {
    let (output, errors, status) =
        csv_to_tsv("name,email,age\n\"Doe, Jane\",\"jane.doe@example.org\",42\n");

    assert_eq!(
        output,
        "name\temail\tage\nDoe, Jane\tjane.doe@example.org\t42\n"
    );
    assert!(errors.is_empty());
    assert_eq!(status, StepStatus::Success);
}

#[test]
fn csv_to_tsv_to_csv_is_idempotent_on_plain_data() {
    let csv = "year,make,model\n1948,Porsche,356\n2011,Peugeot,206+\n2012,Citroën,C4 Picasso\n";

    let (tsv, _, _) = csv_to_tsv(csv);
    assert_eq!(tsv_to_csv(&tsv), csv);
}

#[test]
fn crlf_input_is_normalised() {
    let (output, _, status) = csv_to_tsv("a,b\r\nc,d\r\n");
    assert_eq!(output, "a\tb\nc\td\n");
    assert_eq!(status, StepStatus::Success);
}

#[test]
fn field_count_is_inferred_from_first_record() {
    let (output, errors, status) = csv_to_tsv("a,b\nc,d,e\n");

    assert_eq!(output, "a\tb\n");
    assert_eq!(
        errors,
        "record on line 2: wrong number of fields (expected 2, found 3)\n"
    );
    assert_eq!(status, StepStatus::Failed);
}

#[test]
fn comment_lines_produce_nothing() -> Result<(), Box<dyn Error>> {
    let records = decode("# a comment\n".as_bytes(), TranscoderConfig::csv())?
        .collect::<Vec<_>>();
    assert!(records.is_empty());

    let (output, errors, status) = csv_to_tsv("# header comment\na,b\n");
    assert_eq!(output, "a\tb\n");
    assert!(errors.is_empty());
    assert_eq!(status, StepStatus::Success);
    Ok(())
}

#[test]
fn quoting_only_where_needed() {
    let encoding = Encoding::csv();
    assert_eq!(encode(&Record::from(vec!["Doe, Jane"]), &encoding), b"\"Doe, Jane\"\n");
    assert_eq!(encode(&Record::from(vec!["Doe"]), &encoding), b"Doe\n");
}

#[test]
fn unterminated_quote_strict_and_lazy() -> Result<(), Box<dyn Error>> {
    let strict = decode("\"unterminated".as_bytes(), TranscoderConfig::csv())?
        .collect::<Vec<_>>();
    assert_eq!(strict.len(), 1);
    assert!(matches!(
        strict[0],
        Err(TranscodeError::MalformedQuoting { line: 1, .. })
    ));

    let lazy_config = TranscoderConfig {
        lazy_quotes: true,
        ..TranscoderConfig::csv()
    };
    let lazy = decode("\"unterminated".as_bytes(), lazy_config)?.collect::<Vec<_>>();
    assert_eq!(lazy.len(), 1);
    assert_eq!(*lazy[0].as_ref().unwrap(), vec!["\"unterminated"]);
    Ok(())
}

#[test]
fn encoded_records_decode_to_themselves() -> Result<(), Box<dyn Error>> {
    let records: Vec<Record> = vec![
        Record::from(vec!["id", "name", "note"]),
        Record::from(vec!["#tag", "hashtag", "# inline"]),
        Record::from(vec!["1", "Doe, Jane", "says \"hi\""]),
        Record::from(vec!["2", "", "tab\there"]),
        Record::from(vec!["3", " padded ", "\"quoted\""]),
        Record::from(vec!["4", ",", "\""]),
    ];

    for (encoding, config) in [
        (Encoding::csv(), TranscoderConfig::csv()),
        (Encoding::tsv(), TranscoderConfig::tsv()),
        (
            Encoding::new(b';', QuoteStyle::Always)?,
            TranscoderConfig {
                delimiter: b';',
                ..TranscoderConfig::csv()
            },
        ),
    ] {
        let bytes: Vec<u8> = records
            .iter()
            .flat_map(|record| encode(record, &encoding))
            .collect();

        let decoded = decode(bytes.as_slice(), config)?.collect::<Result<Vec<_>, _>>()?;
        assert_eq!(decoded, records);
    }
    Ok(())
}

#[test]
fn multi_line_quoted_fields_survive_tsv() {
    let (output, _, status) = csv_to_tsv("a,\"line one\nline two\"\n");
    assert_eq!(output, "a\t\"line one\nline two\"\n");
    assert_eq!(status, StepStatus::Success);
}

#[test]
fn reused_records_give_the_same_output() -> Result<(), Box<dyn Error>> {
    let csv = "a,b,c\nd,e,f\ng,h,i\n";

    let mut outputs = Vec::new();
    for reuse in [false, true] {
        let reader = DelimitedItemReaderBuilder::new()
            .reuse_record(reuse)
            .from_reader(csv.as_bytes())?;
        let writer = DelimitedItemWriterBuilder::new()
            .encoding(Encoding::tsv())
            .from_writer(Vec::new())?;

        let execution = StepBuilder::new("reuse")
            .reader(&reader)
            .writer(&writer)
            .build()
            .execute();
        assert!(execution.is_success());
        outputs.push(writer.into_inner()?);
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], b"a\tb\tc\nd\te\tf\ng\th\ti\n");
    Ok(())
}

#[test]
fn exact_field_count_checks_first_record() -> Result<(), Box<dyn Error>> {
    let reader = DelimitedItemReaderBuilder::new()
        .fields_per_record(FieldsPerRecord::Exact(3))
        .from_reader("a,b\nc,d,e\n".as_bytes())?;
    let writer = DelimitedItemWriterBuilder::new().from_writer(Vec::new())?;

    let execution = StepBuilder::new("exact")
        .reader(&reader)
        .writer(&writer)
        .build()
        .execute();

    assert_eq!(execution.status, StepStatus::Failed);
    assert_eq!(execution.read_error_count, 1);
    assert_eq!(writer.into_inner()?, b"c,d,e\n");
    Ok(())
}

#[test]
fn leading_hash_survives_csv_to_tsv_to_csv() {
    let csv = "tag,count\n\"#rust\",3\n";

    let (tsv, errors, status) = csv_to_tsv(csv);
    assert_eq!(tsv, "tag\tcount\n\"#rust\"\t3\n");
    assert!(errors.is_empty());
    assert_eq!(status, StepStatus::Success);

    assert_eq!(tsv_to_csv(&tsv), csv);
}

#[test]
fn invalid_utf8_record_is_skipped() {
    let mut output = Vec::new();
    let mut errors = Vec::new();
    let execution = transcode(
        "csv2tab",
        TranscoderConfig::csv(),
        Encoding::tsv(),
        false,
        &b"a,b\nc\xff,d\ne,f\n"[..],
        &mut output,
        &mut errors,
    )
    .unwrap();

    assert_eq!(execution.status, StepStatus::Failed);
    assert_eq!(execution.read_error_count, 1);
    assert_eq!(output, b"a\tb\ne\tf\n");
    assert_eq!(
        String::from_utf8(errors).unwrap(),
        "record on line 2: invalid UTF-8 at byte 1\n"
    );
}
