use std::fs;
use std::io::Read;
use std::path::Path;

use solution_renamer::defaults::RenamerConfig;
use solution_renamer::local_files::LocalFs;
use solution_renamer::logs::MemoryLogger;
use solution_renamer::refactor::{ProgressRecord, Renamer};
use solution_renamer::tree::{build_tree, RuleChain};
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seed_solution(root: &Path) {
    write(
        &root.join("Acme.sln"),
        "Project(\"{FAE04EC0}\") = \"Acme.Api\", \"Acme.Api\\Acme.Api.csproj\"\n",
    );
    write(&root.join(".git").join("config"), "[remote] url = acme.git\n");
    write(
        &root.join("Acme.Api").join("Acme.Api.csproj"),
        "<RootNamespace>Acme.Api</RootNamespace>\n",
    );
    write(
        &root.join("Acme.Api").join("Controllers").join("AcmeController.cs"),
        "namespace Acme.Api.Controllers\n{\n    public class AcmeController {}\n}\n",
    );
    write(&root.join("Acme.Api").join("bin").join("Acme.Api.dll"), "MZ Acme");
    write(&root.join("Acme.Api").join("obj").join("Acme.Api.pdb"), "Acme");
}

#[test]
fn tree_marks_build_output_and_git_as_excluded() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Acme");
    seed_solution(&root);

    let tree = build_tree(&root, &RuleChain::standard(), &LocalFs::new()).unwrap();

    assert!(tree.contains_exactly_one_solution_file());
    for name in [".git", "bin", "obj"] {
        let node = tree.iter().find(|n| n.file_name() == name).unwrap();
        assert!(!node.is_included, "{} should be excluded", name);
    }
    assert!(tree.item_count(false) < tree.item_count(true));
}

#[test]
fn rename_backs_up_then_renames_everything_included() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Acme");
    seed_solution(&root);

    let logger = MemoryLogger::new();
    let mut renamer = Renamer::new(
        &logger,
        Box::new(LocalFs::new()),
        RenamerConfig::default().without_delays(),
    );
    renamer.set_rename("Acme", "Contoso");
    renamer.set_target_folder(&root).unwrap();
    assert!(renamer.ready());

    let mut records: Vec<ProgressRecord> = Vec::new();
    let mut sink = |r: ProgressRecord| records.push(r);
    renamer.do_rename(&mut sink).unwrap();

    assert!(renamer.is_completed());
    assert!(records.iter().all(|r| !r.is_error));
    assert_eq!(
        records.iter().filter(|r| r.message.ends_with("Skipped.")).count(),
        3
    );

    // Backup holds the pre-rename content.
    let date = chrono::Local::now().date_naive().format("%Y%m%d").to_string();
    let zip_path = dir.path().join(format!("Acme_{}.zip", date));
    let mut archive = zip::ZipArchive::new(fs::File::open(zip_path).unwrap()).unwrap();
    let mut backed_up = String::new();
    archive
        .by_name("Acme.Api/Controllers/AcmeController.cs")
        .unwrap()
        .read_to_string(&mut backed_up)
        .unwrap();
    assert!(backed_up.contains("namespace Acme.Api.Controllers"));

    let renamed = dir.path().join("Contoso");
    assert!(!root.exists());
    assert_eq!(
        fs::read_to_string(renamed.join("Contoso.sln")).unwrap(),
        "Project(\"{FAE04EC0}\") = \"Contoso.Api\", \"Contoso.Api\\Contoso.Api.csproj\"\n"
    );
    let api = renamed.join("Contoso.Api");
    assert!(api.join("Contoso.Api.csproj").exists());
    assert_eq!(
        fs::read_to_string(api.join("Controllers").join("ContosoController.cs")).unwrap(),
        "namespace Contoso.Api.Controllers\n{\n    public class ContosoController {}\n}\n"
    );

    // Excluded entries are untouched.
    assert_eq!(
        fs::read_to_string(api.join("bin").join("Acme.Api.dll")).unwrap(),
        "MZ Acme"
    );
    assert_eq!(
        fs::read_to_string(renamed.join(".git").join("config")).unwrap(),
        "[remote] url = acme.git\n"
    );
}

#[test]
fn clean_empties_build_output_in_place() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Acme");
    seed_solution(&root);

    let logger = MemoryLogger::new();
    let mut renamer = Renamer::new(
        &logger,
        Box::new(LocalFs::new()),
        RenamerConfig::default().without_delays(),
    );
    renamer.set_target_folder(&root).unwrap();

    assert!(renamer.clean_folders("bin"));
    assert!(renamer.clean_folders("obj"));

    let api = root.join("Acme.Api");
    assert!(api.join("bin").is_dir());
    assert_eq!(fs::read_dir(api.join("bin")).unwrap().count(), 0);
    assert_eq!(fs::read_dir(api.join("obj")).unwrap().count(), 0);
    assert!(api.join("Acme.Api.csproj").exists());
    assert!(logger.warnings().is_empty());
}
