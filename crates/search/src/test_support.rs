//! Hand-built record model shared by unit tests
//!
//! Malaysia
//!   APU       Ka Fei Thang (nzeb 2025, shared 2022), Maghami (shared 2022)
//!   UM        Lee (shared 2022, solar 2021)
//! China
//!   Tsinghua  Wei Zhang (grid 2023)

use scholarmap_common::model::{Author, Country, Paper, RecordModel, University};

fn paper(id: &str, title: &str, year: i32, cited_by: u32, authors: &[&str]) -> Paper {
    Paper {
        id: id.to_string(),
        title: title.to_string(),
        year,
        source: "Energy and Buildings".to_string(),
        cited_by,
        doi: format!("10.1/{}", id),
        link: format!("https://example.org/{}", id),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        document_type: None,
        eid: None,
    }
}

fn author(id: &str, name: &str, affiliation: &str, papers: &[&str]) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        affiliation: affiliation.to_string(),
        paper_ids: papers.iter().map(|p| p.to_string()).collect(),
    }
}

fn university(id: &str, name: &str, country_id: &str, authors: Vec<Author>) -> University {
    University {
        id: id.to_string(),
        name: name.to_string(),
        country_id: country_id.to_string(),
        authors,
    }
}

pub(crate) fn sample_model() -> RecordModel {
    let malaysia = Country {
        id: "malaysia".into(),
        name: "Malaysia".into(),
        lat: 4.2105,
        lng: 101.9758,
        universities: vec![
            university(
                "apu",
                "APU",
                "malaysia",
                vec![
                    author("thang", "Ka Fei Thang", "APU", &["nzeb", "shared"]),
                    author("maghami", "Mohammad Reza Maghami", "APU", &["shared"]),
                ],
            ),
            university(
                "um",
                "Universiti Malaya",
                "malaysia",
                vec![author("lee", "Lee Chong", "Universiti Malaya", &["shared", "solar"])],
            ),
        ],
    };
    let china = Country {
        id: "china".into(),
        name: "China".into(),
        lat: 35.8617,
        lng: 104.1954,
        universities: vec![university(
            "tsinghua",
            "Tsinghua University",
            "china",
            vec![author("zhang", "Wei Zhang", "Tsinghua University", &["grid"])],
        )],
    };

    let papers = vec![
        paper("nzeb", "Net zero energy buildings", 2025, 10, &["Ka Fei Thang"]),
        paper(
            "shared",
            "Shared microgrids",
            2022,
            5,
            &["Ka Fei Thang", "Mohammad Reza Maghami", "Lee Chong"],
        ),
        paper("solar", "Solar forecasting", 2021, 3, &["Lee Chong"]),
        paper("grid", "Grid resilience", 2023, 1, &["Wei Zhang"]),
    ];

    RecordModel::from_tree(vec![china, malaysia], papers).expect("sample model is valid")
}
