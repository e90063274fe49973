//! Scripted tour of the library operations.

use std::fmt::Display;

use biblio_core::{Item, LibraryResult, LibraryService};
use tracing::warn;

/// Populate an empty library and exercise every operation once, including
/// the guarded removals that are expected to be refused.
pub fn run(library: &mut LibraryService) {
    println!("=== {} ===", library.name());

    for item in [
        Item::new("978-1", "El Principito", "Antoine de Saint-Exupéry", "Ficción"),
        Item::new("978-2", "Cien Años de Soledad", "Gabriel García Márquez", "Realismo Mágico"),
        Item::new("978-3", "POO para Todos", "W. Nuñez", "Tecnología"),
    ] {
        let label = format!("add item {} ({})", item.id, item.title);
        outcome(&label, library.add_item(item));
    }

    outcome("register member 101", library.register_member(101, "Anita Lucia Proaño"));
    outcome("register member 102", library.register_member(102, "José Ramírez"));

    outcome("lend 978-1 to 101", library.lend(101, "978-1"));
    outcome("lend 978-2 to 102", library.lend(102, "978-2"));

    for member in [101, 102] {
        match library.list_loans_of_member(member) {
            Ok(items) => print_items(&format!("Loans of member {member}"), &items),
            Err(err) => outcome::<()>("list loans", Err(err)),
        }
    }

    print_items("Title contains 'Programación'", &library.search_by_title("Programación"));
    print_items("Creator contains 'García'", &library.search_by_creator("García"));
    print_items("Category is 'Tecnología'", &library.search_by_category("Tecnología"));

    outcome("remove loaned item 978-1", library.remove_item("978-1"));
    outcome("return 978-1 from 101", library.return_item(101, "978-1"));
    outcome("remove item 978-1", library.remove_item("978-1"));

    outcome("unregister member 102", library.unregister_member(102));
    outcome("return 978-2 from 102", library.return_item(102, "978-2"));
    outcome("unregister member 102", library.unregister_member(102));
}

/// Print history, catalog and members.
pub fn print_state(library: &LibraryService) {
    println!("\n--- History ---");
    if library.history().is_empty() {
        println!("(no events)");
    }
    for event in library.history() {
        println!("{event}");
    }

    let items: Vec<_> = library.items().collect();
    print_items("Catalog", &items);

    println!("\nMembers:");
    for member in library.members() {
        println!("  {member}");
    }
}

fn outcome<T>(label: &str, result: LibraryResult<T>) {
    match result {
        Ok(_) => println!("[✓] {label}"),
        Err(err) => {
            warn!(kind = ?err.kind(), "{label} refused: {err}");
            println!("[X] {label}: {err}");
        }
    }
}

fn print_items(heading: &str, items: &[impl Display]) {
    println!("\n{heading}:");
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  {item}");
    }
}
