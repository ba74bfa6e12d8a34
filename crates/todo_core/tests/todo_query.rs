use todo_core::{
    CreateTodoRequest, ListTodosRequest, SearchTodosRequest, StorageHandle, TodoService,
};

fn seeded(titles: &[&str]) -> StorageHandle {
    let store = StorageHandle::ephemeral();
    let service = TodoService::new(&store);
    for title in titles {
        service.create(&CreateTodoRequest::titled(*title)).unwrap();
    }
    store
}

fn page(skip: Option<i64>, limit: Option<i64>) -> ListTodosRequest {
    ListTodosRequest { skip, limit }
}

#[test]
fn list_defaults_to_first_ten_in_insertion_order() {
    let titles: Vec<String> = (1..=12).map(|n| format!("task {n}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let store = seeded(&refs);
    let service = TodoService::new(&store);

    let items = service.list(&ListTodosRequest::default()).unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0].title, "task 1");
    assert_eq!(items[9].title, "task 10");
}

#[test]
fn list_pages_without_overlap() {
    let store = seeded(&["a", "b", "c", "d", "e"]);
    let service = TodoService::new(&store);

    let first = service.list(&page(Some(0), Some(2))).unwrap();
    let second = service.list(&page(Some(2), Some(2))).unwrap();
    let third = service.list(&page(Some(4), Some(2))).unwrap();

    let titles: Vec<_> = first
        .iter()
        .chain(&second)
        .chain(&third)
        .map(|todo| todo.title.as_str())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn skip_past_end_is_empty_not_error() {
    let store = seeded(&["only"]);
    let service = TodoService::new(&store);

    assert!(service.list(&page(Some(1), None)).unwrap().is_empty());
    assert!(service.list(&page(Some(500), Some(100))).unwrap().is_empty());
}

#[test]
fn list_rejects_out_of_range_paging() {
    let store = seeded(&[]);
    let service = TodoService::new(&store);

    let err = service.list(&page(Some(-1), Some(0))).unwrap_err();
    let validation = err.validation().unwrap();
    assert!(validation.has_field("skip"));
    assert!(validation.has_field("limit"));

    let err = service.list(&page(None, Some(101))).unwrap_err();
    assert!(err.validation().unwrap().has_field("limit"));
}

#[test]
fn search_matches_title_substring_ignoring_case() {
    let store = seeded(&["Buy groceries", "Call mom", "grocery list review"]);
    let service = TodoService::new(&store);

    let found = service.search(&SearchTodosRequest::new("GROCER")).unwrap();
    let titles: Vec<_> = found.iter().map(|todo| todo.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy groceries", "grocery list review"]);

    let found = service.search(&SearchTodosRequest::new("GROCERY")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "grocery list review");
}

#[test]
fn search_treats_wildcards_literally() {
    let store = seeded(&["50% off", "500 items", "snake_case", "snakecase"]);
    let service = TodoService::new(&store);

    let found = service.search(&SearchTodosRequest::new("0%")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "50% off");

    let found = service.search(&SearchTodosRequest::new("e_c")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "snake_case");
}

#[test]
fn search_without_matches_is_empty() {
    let store = seeded(&["Buy groceries"]);
    let service = TodoService::new(&store);

    assert!(service
        .search(&SearchTodosRequest::new("dentist"))
        .unwrap()
        .is_empty());
}

#[test]
fn search_requires_non_empty_query() {
    let store = seeded(&[]);
    let service = TodoService::new(&store);

    let err = service.search(&SearchTodosRequest::default()).unwrap_err();
    assert!(err.validation().unwrap().has_field("q"));

    let err = service.search(&SearchTodosRequest::new("")).unwrap_err();
    assert!(err.validation().unwrap().has_field("q"));
}

#[test]
fn very_large_skip_is_empty_not_error() {
    let store = seeded(&["a", "b"]);
    let service = TodoService::new(&store);

    assert!(service
        .list(&page(Some(5_000_000_000), None))
        .unwrap()
        .is_empty());
    assert!(service
        .list(&page(Some(i64::MAX), Some(1)))
        .unwrap()
        .is_empty());
}
