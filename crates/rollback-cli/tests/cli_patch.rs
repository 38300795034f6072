use std::fs;
use std::path::Path;
use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rollback"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run rollback CLI")
}

fn write_data_dir(root: &Path) {
    let tables = root.join("tables");
    fs::create_dir_all(&tables).unwrap();
    fs::write(
        tables.join("gml_GlobalScript_table_equipment.txt"),
        "id;a;b;text\n\
         weapon_name;weapon_name;\n\
         sword;sword;sword;Short Sword\n\
         weapon_name_end;weapon_name_end;\n\
         armor_name;armor_name;\n\
         helm;helm;helm;Helm\n\
         armor_name_end;armor_name_end;\n",
    )
    .unwrap();
    fs::write(
        tables.join("gml_GlobalScript_table_attributes.txt"),
        "id;a;b;text\n\
         attribute_text;attribute_text;\n\
         damage;x;x;Damage\n\
         attribute_text_end;attribute_text_end;\n",
    )
    .unwrap();
    fs::write(tables.join("gml_GlobalScript_table_weapons.txt"), "name;tier;damage\nsword;1;10\n").unwrap();
    fs::write(tables.join("gml_GlobalScript_table_armor.txt"), "name;tier;armor\nhelm;1;5\n").unwrap();
}

fn write_mod_dir(root: &Path) {
    fs::create_dir_all(root).unwrap();
    fs::write(
        root.join("gml_GlobalScript_table_weapons.gml"),
        "[sword]\nname=Short Sword\ntier=2\nDamage=15\n",
    )
    .unwrap();
    fs::write(root.join("gml_GlobalScript_table_armor.gml"), "").unwrap();
}

#[test]
fn cli_patch_rewrites_tables_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    let mod_dir = dir.path().join("mod");
    let report = dir.path().join("report.json");
    write_data_dir(&data);
    write_mod_dir(&mod_dir);

    let output = run_cli(&[
        "patch",
        "--data",
        data.to_str().unwrap(),
        "--mod-dir",
        mod_dir.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let weapons = fs::read_to_string(data.join("tables/gml_GlobalScript_table_weapons.txt")).unwrap();
    assert_eq!(weapons, "name;tier;damage\nsword;2;15\n");

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["merges"][0]["rows_overridden"], 1);
}

#[test]
fn cli_export_writes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    let out = dir.path().join("out");
    write_data_dir(&data);

    let output = run_cli(&[
        "export",
        "--data",
        data.to_str().unwrap(),
        "--table",
        "gml_GlobalScript_table_weapons",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let ini = fs::read_to_string(out.join("gml_GlobalScript_table_weapons.ini")).unwrap();
    assert_eq!(ini, "[sword]\nname=Short Sword\ntier=1\nDamage=10\n\n");
}

#[test]
fn cli_patch_fails_on_unknown_name() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    let mod_dir = dir.path().join("mod");
    write_data_dir(&data);
    write_mod_dir(&mod_dir);
    fs::write(mod_dir.join("gml_GlobalScript_table_weapons.gml"), "[sword]\nname=Claymore\n").unwrap();

    let output = run_cli(&[
        "patch",
        "--data",
        data.to_str().unwrap(),
        "--mod-dir",
        mod_dir.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Claymore"));

    // nothing was written back
    let weapons = fs::read_to_string(data.join("tables/gml_GlobalScript_table_weapons.txt")).unwrap();
    assert_eq!(weapons, "name;tier;damage\nsword;1;10\n");
}
