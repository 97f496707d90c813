use rephrase::corpus::csv::CsvCorpus;
use rephrase::corpus::ndjson::NdjsonCorpus;
use rephrase::corpus::{CorpusLoader, Record, VecCorpus};
use rephrase::error::{Error, Result};

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn csv_picks_columns_and_skips_missing_text() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "reviews.csv",
        "listing_id,id,date,comments\n\
         1,100,2024-01-01,great stay\n\
         1,101,2024-01-02,missing\n\
         2,102,2024-01-03,\n\
         2,103,2024-01-04,\"quiet, clean\"\n",
    );

    let records = CsvCorpus::from_file(&path).load().await?;
    assert_eq!(
        records,
        vec![
            Record::new("100", "great stay"),
            Record::new("103", "quiet, clean")
        ]
    );
    Ok(())
}

#[tokio::test]
async fn csv_sample_size_takes_the_head() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "c.csv", "key,body\na,x\nb,y\nc,z\n");

    let records = CsvCorpus::from_file(&path)
        .id_column("key")
        .text_column("body")
        .sample_size(Some(2))
        .load()
        .await?;
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    Ok(())
}

#[tokio::test]
async fn csv_unknown_column_is_a_corpus_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "c.csv", "id,text\n1,a\n");

    let err = CsvCorpus::from_file(&path).load().await.unwrap_err();
    assert!(matches!(err, Error::Corpus { .. }), "{err}");
}

#[tokio::test]
async fn csv_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvCorpus::from_file(dir.path().join("absent.csv"))
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
}

#[tokio::test]
async fn csv_quoted_newlines_stay_in_one_record() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "c.csv", "id,comments\n7,\"line one\nline two\"\n8,ok\n");

    let records = CsvCorpus::from_file(&path).load().await?;
    assert_eq!(
        records,
        vec![Record::new("7", "line one\nline two"), Record::new("8", "ok")]
    );
    Ok(())
}

#[tokio::test]
async fn ndjson_lines_cross_read_chunks() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "c.ndjson",
        "{\"id\":1,\"text\":\"first review\"}\r\n{\"id\":\"b\",\"text\":\"second\"}\n{\"id\":3,\"text\":\"no newline\"}",
    );

    let records = NdjsonCorpus::from_file(&path)
        .read_chunk_bytes(7)
        .load()
        .await?;
    assert_eq!(
        records,
        vec![
            Record::new("1", "first review"),
            Record::new("b", "second"),
            Record::new("3", "no newline"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn ndjson_blank_lines_are_optional() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "c.ndjson", "{\"id\":1,\"text\":\"a\"}\n\n{\"id\":2,\"text\":\"b\"}\n");

    let err = NdjsonCorpus::from_file(&path).load().await.unwrap_err();
    assert!(matches!(err, Error::Corpus { .. }), "{err}");

    let records = NdjsonCorpus::from_file(&path)
        .allow_empty_lines(true)
        .load()
        .await?;
    assert_eq!(records.len(), 2);
    Ok(())
}

#[tokio::test]
async fn ndjson_malformed_line_reports_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "c.ndjson", "{\"id\":1,\"text\":\"a\"}\nnot json\n");

    let err = NdjsonCorpus::from_file(&path).load().await.unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("line 2"), "{msg}");
    assert!(msg.contains("not json"), "{msg}");
}

#[tokio::test]
async fn ndjson_line_limit_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "c.ndjson", "{\"id\":1,\"text\":\"a long review body\"}\n");

    let err = NdjsonCorpus::from_file(&path)
        .max_line_bytes(10)
        .load()
        .await
        .unwrap_err();
    assert!(format!("{err}").contains("max_line_bytes"), "{err}");
}

#[tokio::test]
async fn ndjson_custom_fields_and_cap() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "c.ndjson",
        "{\"review\":7,\"comments\":\"a\"}\n{\"review\":8,\"comments\":\"b\"}\n",
    );

    let records = NdjsonCorpus::from_file(&path)
        .id_field("review")
        .text_field("comments")
        .sample_size(Some(1))
        .load()
        .await?;
    assert_eq!(records, vec![Record::new("7", "a")]);
    Ok(())
}

#[tokio::test]
async fn vec_corpus_numbers_records_in_order() -> Result<()> {
    let records = VecCorpus::from_texts(["x", "y"]).load().await?;
    assert_eq!(records, vec![Record::new("0", "x"), Record::new("1", "y")]);
    Ok(())
}
