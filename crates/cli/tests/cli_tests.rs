// End-to-end tests for the taxaudit binary.
//
// Every test points --store and --config into its own temp dir so nothing
// touches the user's real settings or reference base.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const BASE: &str = "Descrição item;NCM;Aliq. ICMS;Tributação;CEST\n\
arroz tipo 1;1006;12;T1;41\n\
feijao preto;0713;7;ST;1700100.0\n";

const AUDIT: &str = "Item,Descrição item,NCM,Aliq. ICMS,Tributação,CEST\n\
1,Arroz Tipo 1,1006,7,,\n\
2,Parafuso sextavado,7318,18,T,0\n\
3,,,,,\n";

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("settings.toml"), "").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> std::path::PathBuf {
        let p = self.path(name);
        fs::write(&p, content).unwrap();
        p
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_taxaudit"))
            .arg("--store")
            .arg(self.path("reference.csv"))
            .arg("--config")
            .arg(self.path("settings.toml"))
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("TAXAUDIT_SEED")
            .output()
            .expect("run taxaudit")
    }
}

fn arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn base_import_then_list() {
    let env = Env::new();
    let base = env.write("base.csv", BASE);

    let out = env.run(&["base", "import", arg(&base)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("2 added, 0 updated"));

    let persisted = fs::read_to_string(env.path("reference.csv")).unwrap();
    assert!(persisted.starts_with("description,tax_code,tax_rate,tax_regime,special_code\n"));
    assert!(persisted.contains("feijao preto,0713,7,ST,1700100\n"));

    // Re-import updates in place
    let out = env.run(&["base", "import", arg(&base)]);
    assert!(stderr(&out).contains("0 added, 2 updated"));

    let out = env.run(&["base", "list", "--search", "FEIJAO", "--json"]);
    assert!(out.status.success());
    let val: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let items = val.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["tax_code"], "0713");
    assert_eq!(items[0]["special_code"], "1700100");
}

#[test]
fn import_refuses_unreadable_store() {
    let env = Env::new();
    let base = env.write("base.csv", BASE);
    fs::create_dir(env.path("reference.csv")).unwrap();
    fs::write(env.path("reference.csv").join("keep.txt"), "x").unwrap();

    let out = env.run(&["--seed", arg(&base), "base", "import", arg(&base)]);
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("was not modified"));
    assert!(env.path("reference.csv").join("keep.txt").exists());
}

#[test]
fn import_missing_column_fails_with_parse_code() {
    let env = Env::new();
    let bad = env.write("bad.csv", "Descrição item;Aliq. ICMS\nArroz;12\n");

    let out = env.run(&["base", "import", arg(&bad)]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("Tax Code"));
    assert!(!env.path("reference.csv").exists());
}

#[test]
fn audit_json_reports_changes() {
    let env = Env::new();
    let base = env.write("base.csv", BASE);
    let audit = env.write("audit.csv", AUDIT);
    assert!(env.run(&["base", "import", arg(&base)]).status.success());

    let out = env.run(&["audit", arg(&audit), "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let val: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(val["summary"]["total_rows"], 3);
    assert_eq!(val["summary"]["matched_exact"], 1);
    assert_eq!(val["summary"]["unmatched"], 1);
    assert_eq!(val["summary"]["skipped"], 1);
    assert_eq!(val["summary"]["cells_changed"], 3);

    let row = &val["rows"][0];
    assert_eq!(row["tax_rate"], "12");
    assert_eq!(row["tax_regime"], "T1");
    assert_eq!(row["special_code"], "41");
    assert_eq!(row["changed"]["tax_code"], false);
    assert_eq!(row["changed"]["tax_rate"], true);
    assert_eq!(row["matched_reference"], "ExactDescription: arroz tipo 1");
    assert_eq!(row["match_score"], 100);
    assert_eq!(val["rows"][1]["matched_reference"], "no match found");
}

#[test]
fn audit_writes_reports() {
    let env = Env::new();
    let base = env.write("base.csv", BASE);
    let audit = env.write("audit.csv", AUDIT);
    assert!(env.run(&["base", "import", arg(&base)]).status.success());

    let xlsx = env.path("report.xlsx");
    let csv = env.path("report.csv");
    let out = env.run(&["audit", arg(&audit), "-o", arg(&xlsx), "--csv", arg(&csv)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(xlsx.exists());

    let text = fs::read_to_string(&csv).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "Description,Tax Code,Tax Rate,Tax Regime,Special Code,Item,\
Tax Code Changed,Tax Rate Changed,Tax Regime Changed,Special Code Changed,\
Matched Reference,Match Score"
    );
    assert!(text.contains("Arroz Tipo 1,1006,12,T1,41,1,FALSE,TRUE,TRUE,TRUE,ExactDescription: arroz tipo 1,100"));
}

#[test]
fn strict_audit_fails_on_unmatched() {
    let env = Env::new();
    let base = env.write("base.csv", BASE);
    let audit = env.write("audit.csv", AUDIT);
    assert!(env.run(&["base", "import", arg(&base)]).status.success());

    let out = env.run(&["audit", arg(&audit), "--strict"]);
    assert_eq!(out.status.code(), Some(6));
    assert!(stderr(&out).contains("1 row without a reference match"));
}

#[test]
fn audit_seeds_empty_store() {
    let env = Env::new();
    let base = env.write("base.csv", BASE);
    let audit = env.write("audit.csv", AUDIT);

    let out = env.run(&["--seed", arg(&base), "audit", arg(&audit)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("seeded reference store with 2 entries"));
    assert!(env.path("reference.csv").exists());
}

#[test]
fn bad_settings_exit_config_code() {
    let env = Env::new();
    env.write("settings.toml", "[policy]\nfuzzy_threshold = 400\n");

    let out = env.run(&["config", "show"]);
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn config_show_prints_effective_settings() {
    let env = Env::new();
    env.write("settings.toml", "[policy]\nfuzzy_threshold = 80\n");

    let out = env.run(&["config", "show"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("fuzzy_threshold = 80"));
    assert!(stdout.contains("reference.csv"));
}

#[test]
fn missing_audit_file_is_io_error() {
    let env = Env::new();
    let out = env.run(&["audit", arg(&env.path("nope.csv"))]);
    assert_eq!(out.status.code(), Some(3));
}
