#![allow(dead_code)]

use clap::Parser;
use std::path::Path;
use team_former::{CliConfig, FormationEngine, LocalStorage, Result, TeamFormationPipeline};
use tempfile::TempDir;

pub const HEADER: &str = "Name,Skills,Interests,ExperienceLevel,ProjectPreference,PersonalityTrait";

/// Twelve participants in three groups of four identical profiles.
pub fn three_profile_cohort() -> String {
    let profiles = [
        ("\"python,ml\"", "ai", "Expert", "Leader"),
        ("\"design,ux\"", "web", "Beginner", "Creative"),
        ("\"devops,cloud\"", "health", "Intermediate", "Analytical"),
    ];

    let mut csv = format!("{}\n", HEADER);
    for (p, (skills, interests, level, personality)) in profiles.iter().enumerate() {
        for i in 0..4 {
            csv.push_str(&format!(
                "P{}{},{},{},{},General,{}\n",
                p, i, skills, interests, level, personality
            ));
        }
    }
    csv
}

/// Twelve generated contestants with overlapping skills and interests.
pub fn synthetic_cohort() -> String {
    format!(
        "{}\n\
C1,\"devops,python\",ai,Beginner,General,Analytical\n\
C2,\"cloud,javascript\",gaming,Beginner,General,Creative\n\
C3,\"cloud,javascript,python\",ai,Beginner,General,Leader\n\
C4,\"backend,ml\",\"ai,finance\",Beginner,General,Collaborative\n\
C5,\"data,design,python\",\"ai,health\",Intermediate,General,Analytical\n\
C6,\"javascript,product\",finance,Intermediate,General,Creative\n\
C7,\"cloud,product\",\"finance,web\",Intermediate,General,Leader\n\
C8,\"data,javascript\",\"education,gaming\",Intermediate,General,Collaborative\n\
C9,\"javascript,ml,ux\",education,Expert,General,Analytical\n\
C10,\"devops,javascript\",web,Expert,General,Creative\n\
C11,\"devops,frontend,product\",health,Expert,General,Leader\n\
C12,\"ai,devops,ml\",gaming,Expert,General,Collaborative\n",
        HEADER
    )
}

pub fn mixed_cohort() -> String {
    format!(
        "{}\n\
Alice,\"python,ml\",ai,Expert,General,Leader\n\
Bob,design,\"web,ai\",Beginner,General,Creative\n\
Chen,\"frontend,react\",web,Intermediate,General,Collaborative\n\
Dana,\"python,data\",\"ai,health\",Intermediate,General,Analytical\n\
Eli,devops,health,Expert,General,Leader\n\
Fay,ux,web,Beginner,General,Creative\n\
Gus,\"ml,statistics\",ai,Expert,General,Analytical\n",
        HEADER
    )
}

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn write(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("write fixture");
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("read output")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// CLI config for `contestants.csv` / `project_config.json`, writing to `output_dir`.
    pub fn config(&self, output_dir: &str, extra: &[&str]) -> CliConfig {
        let mut args = vec!["team-former", "--output-path", output_dir];
        args.extend_from_slice(extra);
        CliConfig::parse_from(args)
    }

    pub async fn run(&self, config: CliConfig) -> Result<team_former::core::etl::RunSummary> {
        let storage = LocalStorage::new(self.path());
        FormationEngine::new(TeamFormationPipeline::new(storage, config)).run().await
    }
}

/// `(name, group)` pairs from a feedback table.
pub fn parse_feedback(text: &str) -> Vec<(String, usize)> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    reader
        .records()
        .map(|record| {
            let record = record.expect("feedback row");
            (record[0].to_string(), record[1].parse().expect("group number"))
        })
        .collect()
}

pub fn group_sizes(feedback: &[(String, usize)], groups: usize) -> Vec<usize> {
    let mut sizes = vec![0; groups];
    for (_, group) in feedback {
        sizes[group - 1] += 1;
    }
    sizes
}
