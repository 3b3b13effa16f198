use super::memory_document;
use outliner::import::ImportRecord;
use outliner::{IndexPath, NodeId, NodeType};
use std::collections::HashSet;
use std::thread;

const WRITERS: usize = 8;

fn group_records(tag: usize) -> Vec<ImportRecord> {
    vec![
        ImportRecord::new(NodeType::Container, format!("group-{}", tag)).with_children(vec![
            ImportRecord::new(NodeType::Document, format!("first-{}", tag)),
            ImportRecord::new(NodeType::Document, format!("second-{}", tag)),
        ]),
        ImportRecord::new(NodeType::Document, format!("loose-{}", tag)),
    ]
}

#[test]
fn imports_and_adds_from_many_threads_stay_whole() {
    let doc = memory_document();

    thread::scope(|scope| {
        for tag in 0..WRITERS {
            let doc = &doc;
            scope.spawn(move || {
                doc.import_records(&group_records(tag), &format!("import-{}", tag))
                    .unwrap();
            });
            scope.spawn(move || {
                doc.add_folder(Some(&format!("folder-{}", tag))).unwrap();
            });
        }
    });

    // each import adds its root plus four records
    assert_eq!(doc.len(), WRITERS * 5 + WRITERS);

    let root_ids: HashSet<NodeId> = (0..doc.len())
        .filter_map(|i| doc.node_at(&IndexPath::root(i)))
        .filter(|n| n.node_type == NodeType::Root)
        .map(|n| n.id)
        .collect();
    let expected: HashSet<NodeId> = (0..WRITERS as u64).map(NodeId::import_root).collect();
    assert_eq!(root_ids, expected);

    for root_id in &expected {
        let root_path = doc.path_of(root_id).unwrap();
        let tag = doc.node(root_id).unwrap().title.trim_start_matches("import-").to_string();
        let titles: Vec<(IndexPath, String)> = doc
            .outline()
            .into_iter()
            .filter(|(p, _)| root_path.is_prefix_of(p) && *p != root_path)
            .map(|(p, n)| (p, n.title))
            .collect();
        assert_eq!(
            titles,
            vec![
                (root_path.appending(0), format!("group-{}", tag)),
                (root_path.appending(0).appending(0), format!("first-{}", tag)),
                (root_path.appending(0).appending(1), format!("second-{}", tag)),
                (root_path.appending(1), format!("loose-{}", tag)),
            ]
        );
    }

    let folders = doc
        .outline()
        .into_iter()
        .filter(|(_, n)| n.title.starts_with("folder-"))
        .count();
    assert_eq!(folders, WRITERS);
}
