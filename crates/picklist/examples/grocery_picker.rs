//! Walkthrough of the picklist core as an embedding toolkit would drive it.
//!
//! Builds a grouped multi-select grocery picker, wires a few print-only
//! views onto the signals, and feeds it decoded intents: open, type, pick,
//! create a missing item, bounce off the selection limit, prune a choice.
//!
//! Run with: cargo run -p picklist --example grocery_picker

use picklist::config::{PickListConfig, SelectMode};
use picklist::store::{GroupSeed, OptionSeed};
use picklist::{Intent, ListEntry, PickList};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut config = PickListConfig::default();
    config.multi.max_selected = Some(3);
    config.create_items.enabled = true;
    config.create_items.select_created = true;
    config.dropdown.close_after_change = false;

    let mut list = PickList::new(
        SelectMode::Multi,
        vec![GroupSeed::new("Fruit"), GroupSeed::new("Vegetables")],
        vec![
            OptionSeed::new("Apple").in_group(0),
            OptionSeed::new("Banana").in_group(0),
            OptionSeed::new("Cherry").in_group(0),
            OptionSeed::new("Carrot").in_group(1),
            OptionSeed::new("Celery").in_group(1),
        ],
        config,
    )
    .expect("configuration is valid");

    // A choice-strip view: re-renders the whole selection from each payload.
    list.changed.connect(|change| {
        let values: Vec<&str> = change.selection.iter().map(|o| o.text.as_str()).collect();
        println!("choices: [{}]", values.join(", "));
    });
    list.search_filtered.connect(|(keyword, count)| {
        println!("{count} result(s) for {keyword:?}");
    });
    list.creator_toggled.connect(|offer| {
        if let Some(keyword) = offer {
            println!("offering to create {keyword:?}");
        }
    });
    list.option_created.connect(|option| println!("created {:?}", option.text));
    list.max_selected.connect(|_| println!("selection limit reached"));

    list.initialize().expect("widget is alive");

    // Open, type "ce", take the highlighted match (Celery).
    list.dispatch(Intent::Activate).expect("widget is alive");
    list.filter("ce", false).expect("widget is alive");
    list.dispatch(Intent::EnterKey).expect("widget is alive");

    // Nothing matches "kiwi", so the creator entry stands in; activating it
    // creates and auto-selects the new option.
    list.filter("kiwi", false).expect("widget is alive");
    list.dispatch(Intent::ClickEntry(ListEntry::Creator))
        .expect("widget is alive");

    // Back to the full list; the third pick fills the limit, the fourth
    // one is refused.
    list.filter("", false).expect("widget is alive");
    list.dispatch(Intent::ClickEntry(ListEntry::Option(0)))
        .expect("widget is alive");
    list.dispatch(Intent::ClickEntry(ListEntry::Option(1)))
        .expect("widget is alive");

    // Backspace on the empty search field moves the cursor into the choice
    // strip; deselecting the highlighted choice frees a slot again.
    list.dispatch(Intent::BackspaceKey { search_empty: true })
        .expect("widget is alive");
    list.deselect_highlighted_choices().expect("widget is alive");

    println!("final selection: {:?}", list.selected_values());
}
