use labelgraph::graph::{props, GraphStore, PropertyMap};
use labelgraph::mapping::{ClassSpec, LabelModule, Mapper, MapperConfig};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("labelgraph v{}", labelgraph::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => MapperConfig::from_path(path)?,
        None => MapperConfig::default(),
    };
    let store = Arc::new(GraphStore::new());
    let mapper = Mapper::with_config(store.clone(), config);

    demo_inheritance(&mapper)?;
    demo_index_routing(&mapper)?;
    demo_mixin(&mapper)?;

    println!("\nStore Statistics:");
    println!("  Total nodes: {}", store.node_count());
    println!("  Storage indexes: {}", store.index_count());
    Ok(())
}

fn demo_inheritance(mapper: &Mapper) -> anyhow::Result<()> {
    println!("=== Demo 1: Inherited Labels ===");
    let person = mapper.define(ClassSpec::new("Person").property("name"))?;
    let employee = mapper.define(ClassSpec::new("Employee").extends(&person).property("company"))?;

    let labels: Vec<String> = mapper.labels_for(&employee)?.iter().map(|l| l.to_string()).collect();
    println!("✓ Employee maps to labels {:?}", labels);

    mapper.create(&person, props([("name", "Alice")]))?;
    mapper.create(&employee, props([("name", "Bob"), ("company", "Acme")]))?;

    println!("  Person.all   -> {} nodes", mapper.all(&person, PropertyMap::new())?.count()?);
    println!("  Employee.all -> {} nodes", mapper.all(&employee, PropertyMap::new())?.count()?);
    Ok(())
}

fn demo_index_routing(mapper: &Mapper) -> anyhow::Result<()> {
    println!("\n=== Demo 2: Index Routing ===");
    let person = mapper.define(ClassSpec::new("Person").property("name"))?;

    let by_name = mapper.all(&person, props([("name", "Bob")]))?;
    println!("  before index: {}", by_name.route());

    let handles = mapper.index(&person, "name")?;
    println!("✓ Declared index on {} label(s)", handles.len());
    println!("  after index:  {}", by_name.route());

    let bob = mapper.find(&person, props([("name", "Bob")]))?;
    println!("  found {} with labels {:?}", bob.id(), bob.labels());
    Ok(())
}

fn demo_mixin(mapper: &Mapper) -> anyhow::Result<()> {
    println!("\n=== Demo 3: Module Labels ===");
    let tagged = LabelModule::new("Taggable").with_label("tagged");
    let note = mapper.define(ClassSpec::new("Note").include(tagged.clone()).property("text"))?;

    let created = mapper.create(&note, props([("text", "hello")]))?;
    let found = mapper.find(&tagged, props([("text", "hello")]))?;
    println!("✓ Found note through module label: {}", found == created);
    Ok(())
}
