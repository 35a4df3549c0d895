//! End-to-end pipeline tests: articles in, chunked and deduplicated
//! tabular output out, with no network involved.

use litharvest_core::aggregate::{self, PREFERRED_FIELDS};
use litharvest_core::chunk::{self, DEFAULT_WRAP_WIDTH};
use litharvest_core::dedup::dedup_records;
use litharvest_core::model::Source;
use litharvest_core::{ChunkRecord, RawArticle};

fn article(source: Source, doi: Option<&str>, summary: &str) -> RawArticle {
    RawArticle {
        paper_id: match source {
            Source::Arxiv => "http://arxiv.org/abs/2401.00001v1".to_string(),
            Source::Medrxiv => "10.1101/2024.02.10.24301234".to_string(),
            Source::EuropePmc => "MED_38012345".to_string(),
        },
        source,
        title: "Machine learning for gestational diabetes screening".to_string(),
        authors: "Ada Lovelace, Grace Hopper".to_string(),
        published: "2024-02-10".to_string(),
        summary: summary.to_string(),
        doi: doi.map(|d| d.to_string()),
        pdf_url: match source {
            Source::Arxiv => Some("https://arxiv.org/pdf/2401.00001v1.pdf".to_string()),
            _ => None,
        },
    }
}

fn long_summary() -> String {
    "We evaluate screening models on two retrospective cohorts. "
        .repeat(20)
        .trim()
        .to_string()
}

#[test]
fn chunks_carry_contiguous_ids_and_reconstruct_the_abstract() {
    let article = article(Source::Arxiv, None, &long_summary());
    let records = chunk::chunk_records(&article, DEFAULT_WRAP_WIDTH);
    assert!(records.len() > 1);

    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.chunk_id, index);
        assert!(record.text_chunk.chars().count() <= DEFAULT_WRAP_WIDTH);
        assert_eq!(record.paper_id, article.paper_id);
        assert_eq!(record.published, "2024-02-10");
    }

    let rejoined = records
        .iter()
        .map(|record| record.text_chunk.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rejoined, chunk::normalize_whitespace(&article.summary));
}

#[test]
fn cross_source_duplicates_resolve_to_the_higher_precedence_source() {
    let summary = long_summary();
    // Same DOI and date from two sources produces identical chunk text.
    let arxiv = chunk::chunk_records(
        &article(Source::Arxiv, Some("10.1101/dup"), &summary),
        DEFAULT_WRAP_WIDTH,
    );
    let medrxiv = chunk::chunk_records(
        &article(Source::Medrxiv, Some("10.1101/dup"), &summary),
        DEFAULT_WRAP_WIDTH,
    );
    let expected = arxiv.len();

    let merged = aggregate::merge(vec![arxiv, medrxiv]);
    assert_eq!(merged.len(), expected);
    assert!(merged.iter().all(|record| record.source == Source::Arxiv));
}

#[test]
fn distinct_papers_survive_the_merge() {
    let arxiv = chunk::chunk_records(
        &article(Source::Arxiv, None, "Transformer models for triage."),
        DEFAULT_WRAP_WIDTH,
    );
    let medrxiv = chunk::chunk_records(
        &article(
            Source::Medrxiv,
            Some("10.1101/2024.02.10.24301234"),
            "A prospective cohort study of screening uptake.",
        ),
        DEFAULT_WRAP_WIDTH,
    );
    let europepmc = chunk::chunk_records(
        &article(
            Source::EuropePmc,
            Some("10.1000/epmc.1"),
            "Background: risk prediction remains difficult.",
        ),
        DEFAULT_WRAP_WIDTH,
    );

    let merged = aggregate::merge(vec![arxiv, medrxiv, europepmc]);
    assert_eq!(merged.len(), 3);
    let sources: Vec<Source> = merged.iter().map(|record| record.source).collect();
    assert_eq!(sources, vec![Source::Arxiv, Source::Medrxiv, Source::EuropePmc]);
}

#[test]
fn merge_is_idempotent() {
    let summary = long_summary();
    let records = aggregate::merge(vec![
        chunk::chunk_records(
            &article(Source::Arxiv, Some("10.1101/dup"), &summary),
            DEFAULT_WRAP_WIDTH,
        ),
        chunk::chunk_records(
            &article(Source::EuropePmc, Some("10.1101/dup"), &summary),
            DEFAULT_WRAP_WIDTH,
        ),
    ]);
    let again = dedup_records(records.clone());
    assert_eq!(records.len(), again.len());
}

#[test]
fn projected_table_has_the_preferred_header_and_aligned_rows() {
    let merged = aggregate::merge(vec![
        chunk::chunk_records(
            &article(Source::Arxiv, None, "Short arxiv abstract."),
            DEFAULT_WRAP_WIDTH,
        ),
        chunk::chunk_records(
            &article(
                Source::EuropePmc,
                Some("10.1000/epmc.1"),
                "Short europe pmc abstract.",
            ),
            DEFAULT_WRAP_WIDTH,
        ),
    ]);

    let table = aggregate::project(&merged).unwrap();
    assert_eq!(
        table.header,
        PREFERRED_FIELDS
            .iter()
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
    );
    for row in &table.rows {
        assert_eq!(row.len(), table.header.len());
        for value in row {
            assert!(!value.contains('\n'));
        }
    }

    // The arXiv row fills pdf_url and leaves doi empty; the Europe PMC row
    // does the opposite.
    let pdf_col = table.header.iter().position(|h| h == "pdf_url").unwrap();
    let doi_col = table.header.iter().position(|h| h == "doi").unwrap();
    let source_col = table.header.iter().position(|h| h == "source").unwrap();
    for row in &table.rows {
        if row[source_col] == "arxiv" {
            assert!(!row[pdf_col].is_empty());
            assert!(row[doi_col].is_empty());
        } else {
            assert!(row[pdf_col].is_empty());
            assert_eq!(row[doi_col], "10.1000/epmc.1");
        }
    }
}

#[test]
fn empty_merge_projects_to_an_empty_table() {
    let records: Vec<ChunkRecord> = aggregate::merge(vec![Vec::new(), Vec::new()]);
    assert!(records.is_empty());
    let table = aggregate::project(&records).unwrap();
    assert!(table.header.is_empty());
    assert!(table.rows.is_empty());
}
