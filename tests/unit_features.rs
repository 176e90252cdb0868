// Unit tests for feature construction and corpus statistics.
//
// Tests the fixed feature layout, graph features computed through the
// relation matrices, statistics lookups, and idf properties.

use mllm::features::{candidates_to_features, CorpusStats, Feature};
use mllm::lexical::matcher::Candidate;
use mllm::vocab::vocabulary::{CollectionRecord, SubjectRecord};
use mllm::vocab::{RelationMatrices, SubjectId, Vocabulary};
use proptest::prelude::*;

fn candidate(subject_id: SubjectId, freq: f64) -> Candidate {
    Candidate {
        doc_length: 4,
        subject_id,
        freq,
        is_pref: 1.0,
        n_tokens: 2.0,
        ambiguity: 0.5,
        first_occ: 0.25,
        last_occ: 0.75,
        spread: 0.5,
    }
}

fn subject(uri: &str) -> SubjectRecord {
    SubjectRecord {
        uri: uri.to_string(),
        ..Default::default()
    }
}

/// Subjects s0..s3; s1 is broader of s2, s2 narrower-links s3, s0 related
/// to s1; collection "c" holds s1 and s2.
fn graph_vocab() -> Vocabulary {
    let mut s2 = subject("s2");
    s2.broader = vec!["s1".to_string()];
    s2.narrower = vec!["s3".to_string()];
    let mut s0 = subject("s0");
    s0.related = vec!["s1".to_string()];
    Vocabulary::new(
        vec![s0, subject("s1"), s2, subject("s3")],
        vec![CollectionRecord {
            uri: "c".to_string(),
            members: vec!["s1".to_string(), "s2".to_string()],
        }],
    )
}

fn value(matrix: &ndarray::Array2<f32>, row: usize, feature: Feature) -> f32 {
    matrix[[row, feature.index()]]
}

// ============================================================
// Layout
// ============================================================

#[test]
fn feature_names_follow_fixed_order() {
    let names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "freq", "doc_freq", "subj_freq", "tfidf", "is_pref", "n_tokens", "ambiguity",
            "first_occ", "last_occ", "spread", "doc_length", "broader", "narrower", "related",
            "collection",
        ]
    );
}

#[test]
fn row_count_and_order_match_candidates() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let stats = CorpusStats::default();
    let candidates = vec![candidate(3, 0.1), candidate(0, 0.2), candidate(2, 0.3)];
    let matrix = candidates_to_features(&candidates, &relations, &stats);

    assert_eq!(matrix.shape(), &[3, Feature::COUNT]);
    assert!((value(&matrix, 0, Feature::Freq) - 0.1).abs() < 1e-6);
    assert!((value(&matrix, 1, Feature::Freq) - 0.2).abs() < 1e-6);
    assert!((value(&matrix, 2, Feature::Freq) - 0.3).abs() < 1e-6);
}

#[test]
fn candidate_fields_copied_into_slots() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let matrix = candidates_to_features(&[candidate(0, 0.5)], &relations, &CorpusStats::default());

    assert_eq!(value(&matrix, 0, Feature::IsPref), 1.0);
    assert_eq!(value(&matrix, 0, Feature::NTokens), 2.0);
    assert_eq!(value(&matrix, 0, Feature::Ambiguity), 0.5);
    assert_eq!(value(&matrix, 0, Feature::FirstOcc), 0.25);
    assert_eq!(value(&matrix, 0, Feature::LastOcc), 0.75);
    assert_eq!(value(&matrix, 0, Feature::Spread), 0.5);
    assert_eq!(value(&matrix, 0, Feature::DocLength), 4.0);
}

// ============================================================
// Graph features
// ============================================================

#[test]
fn broader_feature_points_one_way() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let candidates = vec![candidate(1, 0.5), candidate(2, 0.5)];
    let matrix = candidates_to_features(&candidates, &relations, &CorpusStats::default());

    // s2's broader subject s1 is among the candidates
    assert_eq!(value(&matrix, 1, Feature::Broader), 0.5);
    // Nothing broader than s1 is a candidate
    assert_eq!(value(&matrix, 0, Feature::Broader), 0.0);
}

#[test]
fn relation_features_only_count_candidates() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    // s3 (narrower of s2) and s1 (related to s0) are not candidates here
    let candidates = vec![candidate(0, 0.5), candidate(2, 0.5)];
    let matrix = candidates_to_features(&candidates, &relations, &CorpusStats::default());

    assert_eq!(value(&matrix, 0, Feature::Related), 0.0);
    assert_eq!(value(&matrix, 1, Feature::Narrower), 0.0);
    assert_eq!(value(&matrix, 1, Feature::Broader), 0.0);

    let candidates = vec![candidate(0, 0.5), candidate(1, 0.5), candidate(2, 0.5), candidate(3, 0.5)];
    let matrix = candidates_to_features(&candidates, &relations, &CorpusStats::default());
    assert_eq!(value(&matrix, 0, Feature::Related), 0.25);
    assert_eq!(value(&matrix, 2, Feature::Narrower), 0.25);
}

#[test]
fn collection_feature_counts_shared_membership() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let candidates = vec![candidate(1, 0.5), candidate(2, 0.5), candidate(3, 0.5)];
    let matrix = candidates_to_features(&candidates, &relations, &CorpusStats::default());

    // s1 and s2 share collection "c" (and each overlaps itself)
    assert!((value(&matrix, 0, Feature::Collection) - 2.0 / 3.0).abs() < 1e-6);
    assert!((value(&matrix, 1, Feature::Collection) - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(value(&matrix, 2, Feature::Collection), 0.0);
}

#[test]
fn subjects_outside_matrices_have_no_graph_features() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let matrix = candidates_to_features(&[candidate(99, 0.5)], &relations, &CorpusStats::default());
    assert_eq!(value(&matrix, 0, Feature::Broader), 0.0);
    assert_eq!(value(&matrix, 0, Feature::Collection), 0.0);
}

// ============================================================
// Statistics lookups
// ============================================================

#[test]
fn statistics_feed_features_with_neutral_defaults() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let mut stats = CorpusStats::new(false);
    stats.observe(&[candidate(1, 0.5)], &[1]);
    stats.observe(&[candidate(1, 0.5)], &[]);
    stats.finalize_idf(&[0, 1, 2, 3]);

    let matrix = candidates_to_features(&[candidate(1, 0.5), candidate(2, 0.5)], &relations, &stats);

    assert_eq!(value(&matrix, 0, Feature::DocFreq), 2.0);
    assert_eq!(value(&matrix, 1, Feature::DocFreq), 0.0);
    assert_eq!(value(&matrix, 0, Feature::SubjFreq), 0.0);
    // tfidf = freq * idf, idf(s1) = ln(3/3) + 1 = 1
    assert!((value(&matrix, 0, Feature::Tfidf) - 0.5).abs() < 1e-6);
    let idf2 = (3.0f64).ln() + 1.0;
    assert!((value(&matrix, 1, Feature::Tfidf) as f64 - 0.5 * idf2).abs() < 1e-5);
}

#[test]
fn tracked_subject_frequency_reaches_feature() {
    let relations = RelationMatrices::from_vocabulary(&graph_vocab());
    let mut stats = CorpusStats::new(true);
    for _ in 0..3 {
        stats.observe(&[candidate(1, 0.5)], &[1]);
    }
    let matrix = candidates_to_features(&[candidate(1, 0.5)], &relations, &stats);
    assert_eq!(value(&matrix, 0, Feature::SubjFreq), 2.0);
}

// ============================================================
// idf properties
// ============================================================

fn stats_with(doc_count: u32, subject_df: u32) -> CorpusStats {
    let mut stats = CorpusStats::new(false);
    for i in 0..doc_count {
        if i < subject_df {
            stats.observe(&[candidate(0, 1.0)], &[]);
        } else {
            stats.observe(&[], &[]);
        }
    }
    stats.finalize_idf(&[0]);
    stats
}

proptest! {
    #[test]
    fn idf_is_positive(doc_count in 0u32..200, df_frac in 0.0f64..=1.0) {
        let df = (f64::from(doc_count) * df_frac) as u32;
        let stats = stats_with(doc_count, df);
        prop_assert!(stats.idf(0) > 0.0);
    }

    #[test]
    fn idf_decreases_with_doc_freq(doc_count in 1u32..200, df_seed in 0u32..1000) {
        let df = df_seed % doc_count;
        let lower = stats_with(doc_count, df);
        let higher = stats_with(doc_count, df + 1);
        prop_assert!(higher.idf(0) < lower.idf(0));
    }
}
