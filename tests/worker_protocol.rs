/*!
 * JSON requests crossing the worker boundary
 */

use std::fs;
use std::path::Path;
use std::time::Duration;

use marktree::worker::process_json;
use marktree::{Request, Worker, WorkerOutcome};
use serde_json::{json, Value};
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("lib")).unwrap();
    fs::create_dir_all(root.join("logs")).unwrap();
    fs::write(root.join("lib").join("util.py"), "def f():\n    return 1\n").unwrap();
    fs::write(root.join("logs").join("run.log"), "ok").unwrap();
    fs::write(root.join("notes.txt"), "").unwrap();
    dir
}

fn answer(request: Value) -> Value {
    serde_json::from_str(&process_json(&request.to_string())).unwrap()
}

fn name(root: &Path) -> String {
    root.file_name().unwrap().to_string_lossy().to_string()
}

#[test]
fn test_read_files_paths_skips_scanning() {
    let dir = workspace();
    let root = dir.path();

    let outcome = answer(json!({
        "type": "readFilesPaths",
        "workspaceRoot": root,
        "paths": [root.join("notes.txt"), root.join("lib").join("util.py")],
    }));

    let markdown = outcome["markdown"].as_str().unwrap();
    let ws = name(root);
    assert_eq!(
        markdown,
        format!(
            "{ws}/notes.txt\n(Empty file: no content to display)\n\n\
             {ws}/lib/util.py\n```py\ndef f():\n    return 1\n\n```\n\n"
        )
    );
    assert_eq!(outcome["filesCount"], 2);
    assert_eq!(outcome["stats"]["empty"], 1);
}

#[test]
fn test_tree_and_read_paths_honors_additional_ignores() {
    let dir = workspace();
    let root = dir.path();

    let outcome = answer(json!({
        "type": "treeAndReadFilesPaths",
        "workspaceRoot": root,
        "paths": [root.join("logs"), root.join("lib")],
        "additionalIgnores": ["*.log"],
    }));

    let markdown = outcome["markdown"].as_str().unwrap();
    assert!(!markdown.contains("run.log"));
    assert!(markdown.contains("└── logs\n\n2 directories, 0 files"));
    assert!(markdown.contains("└── lib\n    └── util.py\n\n2 directories, 1 files"));
    assert_eq!(outcome["filesCount"], 1);
}

#[test]
fn test_relative_path_rejected() {
    let dir = workspace();

    let outcome = answer(json!({
        "type": "readFilesPaths",
        "workspaceRoot": dir.path(),
        "paths": ["lib/util.py"],
    }));

    assert!(outcome.get("markdown").is_none());
    assert!(outcome["error"].as_str().unwrap().contains("absolute"));
}

#[test]
fn test_nothing_to_copy_is_an_error() {
    let dir = workspace();
    fs::create_dir(dir.path().join("empty")).unwrap();

    let outcome = answer(json!({
        "type": "readFilesSelected",
        "workspaceRoot": dir.path(),
        "selectedPath": dir.path().join("empty"),
    }));

    assert_eq!(outcome["error"], "Worker error: No Markdown content to copy.");
}

#[cfg(unix)]
#[test]
fn test_shell_exec_formats_outputs() {
    let outcome = answer(json!({
        "type": "shellExec",
        "shellCommands": [
            { "command": "echo", "args": ["one"] },
            { "command": "echo", "args": ["two"] },
        ],
    }));

    assert_eq!(
        outcome["markdown"],
        "```sh\n$ echo one\none\n\n$ echo two\ntwo\n```\n"
    );
}

#[test]
fn test_spawned_worker_answers_once() {
    let dir = workspace();
    let request = Request::from_json(
        &json!({
            "type": "tree",
            "workspaceRoot": dir.path(),
            "selectedPath": dir.path(),
        })
        .to_string(),
    )
    .unwrap();

    let handle = Worker::spawn(request).unwrap();
    let response = loop {
        if let Some(result) = handle.wait_timeout(Duration::from_millis(50)) {
            break result.unwrap();
        }
    };

    assert_eq!(response.files_count, 3);
    let outcome = WorkerOutcome::from(Ok(response));
    assert!(matches!(outcome, WorkerOutcome::Success(_)));
}
