use std::sync::Arc;

use instrument_locator::{
    cli::shell::Shell,
    core::store::InstrumentStore,
    image::NoImageLookup,
    runtime::handle::{RuntimeConfig, SessionHandle, spawn_session},
};

fn session() -> SessionHandle {
    spawn_session(InstrumentStore::seeded(), Arc::new(NoImageLookup), RuntimeConfig::default())
}

async fn run_script(handle: &SessionHandle, script: &str) -> String {
    let mut shell = Shell::new(handle.clone(), Vec::new()).with_date("2026-10-18");
    shell.run(script.as_bytes()).await.expect("shell run");
    String::from_utf8(shell.into_output()).expect("utf8 output")
}

#[tokio::test]
async fn search_then_show_prints_table_and_card() {
    let handle = session();
    let out = run_script(&handle, "search for\nshow Hemostat\nquit\n").await;

    assert!(out.contains("Forceps"));
    assert!(out.contains("### Hemostat"));
    assert!(out.contains("Cabinet Location:    C3"));
    assert!(out.contains("Also found in trays: General Kit"));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn inline_add_and_update_reach_the_store() {
    let handle = session();
    let out = run_script(
        &handle,
        "add name=Retractor category=Holding cabinet=D4 quantity=2 trays=\"Ortho Kit\"\n\
         update Retractor quantity=10\n",
    )
    .await;

    assert!(out.contains("Instrument added successfully: Retractor (id 4)"));
    assert!(out.contains("Instrument updated successfully: Retractor"));

    let rec = handle.get_by_name("Retractor").await.expect("get");
    assert_eq!(rec.quantity, 10);
    assert_eq!(rec.trays, "Ortho Kit");
    assert_eq!(rec.last_updated.as_deref(), Some("2026-10-18"));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn add_form_collects_every_field() {
    let handle = session();
    let out = run_script(&handle, "add\nRetractor\nHolding\nD4\nTop\n2\nOrtho Kit\nquit\n").await;

    assert!(out.contains("Instrument Name: "));
    assert!(out.contains("Instrument added successfully: Retractor"));

    let rec = handle.get_by_name("Retractor").await.expect("get");
    assert_eq!(rec.category, "Holding");
    assert_eq!(rec.shelf, "Top");
    assert_eq!(rec.quantity, 2);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn add_form_with_blank_required_field_is_rejected() {
    let handle = session();
    let out = run_script(&handle, "add\nRetractor\n\nD4\n\n\n\nquit\n").await;

    assert!(out.contains("Could not add instrument: missing required field: category"));
    assert_eq!(handle.list().await.expect("list").len(), 3);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn edit_form_keeps_blank_answers_and_applies_changes() {
    let handle = session();
    let before = handle.get_by_name("Forceps").await.expect("get");
    let out = run_script(&handle, "edit Forceps\n\n\n\n\n12\n\nquit\n").await;

    assert!(out.contains("Instrument Name [Forceps]: "));
    assert!(out.contains("Quantity Available [3]: "));
    assert!(out.contains("Instrument updated successfully: Forceps"));

    let after = handle.get_by_name("Forceps").await.expect("get");
    assert_eq!(after.quantity, 12);
    assert_eq!(after.cabinet, before.cabinet);
    assert_eq!(after.trays, before.trays);
    assert_eq!(after.last_updated.as_deref(), Some("2026-10-18"));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn edit_form_with_no_changes_leaves_record_alone() {
    let handle = session();
    let before = handle.get_by_name("Scalpel").await.expect("get");
    let out = run_script(&handle, "edit Scalpel\n\n\n\n\n\n\n").await;

    assert!(out.contains("No changes."));
    assert_eq!(handle.get_by_name("Scalpel").await.expect("get"), before);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn unknown_names_and_bad_input_are_reported() {
    let handle = session();
    let out = run_script(&handle, "show Osteotome\nupdate Osteotome quantity=1\nfrobnicate\nimage Scalpel\n").await;

    assert!(out.contains("instrument not found by name \"Osteotome\""));
    assert!(out.contains("Could not update instrument: instrument not found by name \"Osteotome\""));
    assert!(out.contains("Error: unknown command `frobnicate`. Type `help` for commands."));
    assert!(out.contains("Image for Scalpel: https://via.placeholder.com/150?text=No+Image (no match found)"));

    handle.shutdown().await.expect("shutdown");
}
