#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Unix seconds for noon UTC on the given day
pub fn at(year: i32, month: u32, day: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .unwrap()
        .timestamp()
}

/// Throwaway repository with explicit commit times
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        let repo = Repository::init(dir.path()).expect("Could not init git repo");
        TestRepo { dir, repo }
    }

    /// Initialize inside an existing directory (for multi-project layouts)
    pub fn init_at(parent: &Path, name: &str) -> Repository {
        let path = parent.join(name);
        fs::create_dir_all(&path).expect("Could not create project dir");
        Repository::init(&path).expect("Could not init git repo")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn commit(&self, files: &[(&str, &[u8])], message: &str, time: i64) -> Oid {
        commit_files(&self.repo, files, message, time)
    }

    pub fn tag(&self, name: &str, oid: Oid) {
        tag_lightweight(&self.repo, name, oid);
    }

    /// Annotated tag whose tagger time differs from the commit time
    pub fn annotated_tag(&self, name: &str, oid: Oid, tagger_time: i64) {
        let target = self.repo.find_object(oid, None).unwrap();
        let tagger = signature(tagger_time);
        self.repo
            .tag(name, &target, &tagger, "release", false)
            .expect("Could not create annotated tag");
    }

    pub fn write_file(&self, relative: &str, contents: &str) {
        fs::write(self.path().join(relative), contents).expect("Could not write file");
    }

    /// Delete a file and unstage it; the next commit drops it
    pub fn remove_file(&self, relative: &str) {
        fs::remove_file(self.path().join(relative)).expect("Could not remove file");
        let mut index = self.repo.index().expect("Could not get index");
        index
            .remove_path(Path::new(relative))
            .expect("Could not remove file from index");
        index.write().expect("Could not write index");
    }
}

pub fn signature(time: i64) -> Signature<'static> {
    Signature::new("Test User", "test@example.com", &Time::new(time, 0)).unwrap()
}

/// Write `files` into the work tree, stage them and commit on `HEAD`
pub fn commit_files(repo: &Repository, files: &[(&str, &[u8])], message: &str, time: i64) -> Oid {
    let root = repo.workdir().expect("bare repositories are not supported");
    let mut index = repo.index().expect("Could not get index");

    for (relative, contents) in files {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Could not create directories");
        }
        fs::write(&full, contents).expect("Could not write file");
        index
            .add_path(Path::new(relative))
            .expect("Could not add file to index");
    }
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    let sig = signature(time);

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Could not create commit")
}

pub fn tag_lightweight(repo: &Repository, name: &str, oid: Oid) {
    let target = repo.find_object(oid, None).unwrap();
    repo.tag_lightweight(name, &target, false)
        .expect("Could not create tag");
}
