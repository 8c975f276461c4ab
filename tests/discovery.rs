use std::{fs, path::Path as FsPath, sync::Arc};

use bytes::Bytes;
use datafusion_common::ScalarValue;
use fsql::{
    DateLayout, DateRange, Expr, FsqlError, MismatchPolicy, PartitionedFile, PathPattern,
    PatternStyle, StoreConfig, Table,
};
use futures_util::TryStreamExt;
use object_store::{ObjectStore, PutPayload, memory::InMemory};

async fn memory_table(paths: &[&str]) -> Table {
    let store = InMemory::new();
    for path in paths {
        store
            .put(
                &object_store::path::Path::from(*path),
                PutPayload::from(Bytes::from_static(b"{\"val\": 1}")),
            )
            .await
            .unwrap();
    }
    let store: Arc<dyn ObjectStore> = Arc::new(store);
    Table::new(store, "table")
}

fn write(root: &FsPath, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn names(files: &[PartitionedFile]) -> Vec<String> {
    files
        .iter()
        .map(|file| {
            let location = file.location.as_ref();
            location[location.find("table/").map_or(0, |at| at + 6)..].to_string()
        })
        .collect()
}

fn text(file: &PartitionedFile, column: &str) -> String {
    match file.value(column) {
        Some(ScalarValue::Utf8(Some(value))) => value.clone(),
        other => panic!("column {column} is {other:?}"),
    }
}

#[tokio::test]
async fn hive_tree_with_or_of_custom_predicate() {
    let table = memory_table(&[
        "table/partK1=1/partK2=1/read_me.json",
        "table/partK1=1/partK2=2/read_me_too.json",
        "table/partK1=1/partK2=2/me_read_as_well.json",
        "table/partK1=1/partK2=3/but_i_should_be_ignored.json",
        "table/partK1=2/partK2=1/the_same_here.json",
        "table/partK1=3/partK2=4/oh_and_this_read_too.json",
    ])
    .await;
    let at_most_two = Expr::custom(["partK2"], |values| {
        matches!(values[0], ScalarValue::Utf8(Some(v)) if v.parse::<i64>().is_ok_and(|n| n <= 2))
    });
    let predicate = Expr::or(vec![
        Expr::and(vec![Expr::eq("partK1", "1"), at_most_two]),
        Expr::eq("partK1", "3"),
    ]);
    let files = table.scan().with_predicate(predicate).collect_files().await.unwrap();
    assert_eq!(
        names(&files),
        vec![
            "partK1=1/partK2=1/read_me.json",
            "partK1=1/partK2=2/me_read_as_well.json",
            "partK1=1/partK2=2/read_me_too.json",
            "partK1=3/partK2=4/oh_and_this_read_too.json",
        ]
    );
    assert_eq!(text(&files[3], "partK2"), "4");
}

#[tokio::test]
async fn fixed_columns_with_file_names() {
    let table = memory_table(&[
        "table/read_me/something/read_me.json",
        "table/read_me/something_else/read_me_too.json",
        "table/ignore_me/dont_care/about_this.json",
    ])
    .await
    .with_pattern(
        PathPattern::fixed("first_column/second_column")
            .unwrap()
            .with_file_column("fname")
            .unwrap(),
    );
    let files = table
        .scan()
        .with_predicate(Expr::eq("first_column", "read_me"))
        .collect_files()
        .await
        .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(text(&files[0], "second_column"), "something");
    assert_eq!(text(&files[1], "fname"), "read_me_too.json");
    assert_eq!(files[1].columns.len(), 3);
}

#[tokio::test]
async fn enumerated_levels_are_generated() {
    let paths = [
        "table/read_me/yes/i_will_be_there.json",
        "table/read_me/indeed/i_will_too.json",
        "table/read_me/no/i_will_not_be.json",
        "table/ignore_me/for_real/like_really.json",
    ];
    let table = memory_table(&paths).await.with_pattern(
        PathPattern::fixed("first_column=read_me/second_column=[yes,indeed]")
            .unwrap()
            .with_file_column("fname")
            .unwrap(),
    );
    let files = table.scan().collect_files().await.unwrap();
    assert_eq!(
        names(&files),
        vec![
            "read_me/yes/i_will_be_there.json",
            "read_me/indeed/i_will_too.json"
        ]
    );

    let table = table.with_pattern(
        PathPattern::fixed("first_column=read_me/second_column=yes")
            .unwrap()
            .with_file_column("fname=i_will_be_there.json")
            .unwrap(),
    );
    let files = table.scan().collect_files().await.unwrap();
    assert_eq!(names(&files), vec!["read_me/yes/i_will_be_there.json"]);
}

#[tokio::test]
async fn auto_mode_parses_file_names() {
    let table = memory_table(&[
        "table/col1=4/col2=5/colX=a/a1.json",
        "table/col1=4/col2=6/colX=b/a2.json",
        "table/col1=9/col2=6/colX=b/a1.json",
    ])
    .await
    .with_pattern(PathPattern::auto().with_file_column("fname").unwrap());
    let predicate = Expr::and(vec![
        Expr::eq("col1", "4"),
        Expr::starts_with("fname", "a1"),
    ]);
    let files = table.scan().with_predicate(predicate).collect_files().await.unwrap();
    assert_eq!(names(&files), vec!["col1=4/col2=5/colX=a/a1.json"]);
    let columns: Vec<_> = files[0].columns.iter().map(|c| c.to_string()).collect();
    assert_eq!(columns, vec!["col1=4", "col2=5", "colX=a", "fname=a1.json"]);
}

#[tokio::test]
async fn auto_mode_skips_directories_without_keys() {
    let table = memory_table(&[
        "table/col1=4/col2/colX=a/a1.json",
        "table/col1=4/col2=6/colX=b/a2.json",
    ])
    .await;
    let files = table.scan().collect_files().await.unwrap();
    assert_eq!(names(&files), vec!["col1=4/col2=6/colX=b/a2.json"]);

    let err = table
        .scan()
        .on_mismatch(MismatchPolicy::Error)
        .collect_files()
        .await
        .unwrap_err();
    assert!(matches!(err, FsqlError::SegmentMismatch { ref name, .. } if name == "col2"));
}

#[tokio::test]
async fn local_tree_with_enumerated_hive_level() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "first_column=one/second_column=x/f.json", r#"{"val": 1}"#);
    write(dir.path(), "first_column=two/second_column=x/f.json", r#"{"val": 2}"#);
    write(dir.path(), "first_column=three/second_column=x/f.json", r#"{"val": 3}"#);

    let url = format!("file://{}", dir.path().display());
    let table = Table::open(&url, &StoreConfig::new())
        .unwrap()
        .with_pattern(PathPattern::hive("first_column=[one,two]/second_column").unwrap());
    let files = table.scan().collect_files().await.unwrap();
    let firsts: Vec<_> = files.iter().map(|f| text(f, "first_column")).collect();
    assert_eq!(firsts, vec!["one", "two"]);
}

#[tokio::test]
async fn reassigned_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "c1=4/c1=3/f1.csv", "a\n0\n1\n");
    let table = Table::open(dir.path().to_str().unwrap(), &StoreConfig::new()).unwrap();
    let err = table.scan().collect_files().await.unwrap_err();
    assert_eq!(err.to_string(), "duplicate key inserted: c1");
}

#[tokio::test]
async fn directories_below_the_pattern() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "v1/v2/f1.csv", "a\n0\n");
    let table = Table::open(dir.path().to_str().unwrap(), &StoreConfig::new())
        .unwrap()
        .with_pattern(
            PathPattern::fixed("c1")
                .unwrap()
                .with_file_column("fname")
                .unwrap(),
        );
    assert!(table.scan().collect_files().await.unwrap().is_empty());

    let err = table
        .scan()
        .on_mismatch(MismatchPolicy::Error)
        .collect_files()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no partitions remaining"));
}

#[tokio::test]
async fn listing_is_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["2022_1_3.csv", "2022_1_1.csv", "2022_1_2.csv"] {
        write(dir.path(), name, "a\n1\n");
    }
    let table = Table::open(dir.path().to_str().unwrap(), &StoreConfig::new()).unwrap();
    let files = table.scan().collect_files().await.unwrap();
    let names: Vec<_> = files.iter().map(PartitionedFile::file_name).collect();
    assert_eq!(names, vec!["2022_1_1.csv", "2022_1_2.csv", "2022_1_3.csv"]);
}

#[tokio::test]
async fn date_range_by_predicate_and_by_generation() {
    let table = memory_table(&[
        "table/year=2022/month=4/jaj=29/f0.csv",
        "table/year=2022/month=4/jaj=30/f1.csv",
        "table/year=2022/month=5/jaj=1/f2.csv",
        "table/year=2022/month=5/jaj=2/f3.csv",
    ])
    .await;
    let range = DateRange::parse("2022/4/30", "2022-05-02").unwrap();
    let expected = vec!["year=2022/month=4/jaj=30/f1.csv", "year=2022/month=5/jaj=1/f2.csv"];

    let by_predicate = table
        .scan()
        .with_predicate(Expr::date_range_on(range, "year", "month", "jaj"))
        .collect_files()
        .await
        .unwrap();
    assert_eq!(names(&by_predicate), expected);

    let layout = DateLayout::new().with_names("year", "month", "jaj");
    let generated = table
        .clone()
        .with_pattern(PathPattern::date_range(range, layout).unwrap())
        .scan()
        .collect_files()
        .await
        .unwrap();
    assert_eq!(names(&generated), expected);
    assert_eq!(
        generated[1].value("jaj"),
        Some(&ScalarValue::Int64(Some(1)))
    );
}

#[tokio::test]
async fn zero_padded_fixed_dates() {
    let table = memory_table(&[
        "table/2021/12/31/a.json",
        "table/2022/01/01/b.json",
        "table/2022/01/02/c.json",
    ])
    .await;
    let range = DateRange::parse("2021/12/31", "2022/01/02").unwrap();
    let layout = DateLayout::new()
        .with_style(PatternStyle::Fixed)
        .with_zero_padding(true);
    let files = table
        .with_pattern(PathPattern::date_range(range, layout).unwrap())
        .scan()
        .collect_files()
        .await
        .unwrap();
    assert_eq!(names(&files), vec!["2021/12/31/a.json", "2022/01/01/b.json"]);
}

#[tokio::test]
async fn predicate_generation_matches_listing() {
    let table = memory_table(&[
        "table/kind=a/n=1/f.json",
        "table/kind=b/n=2/f.json",
        "table/kind=c/n=3/f.json",
    ])
    .await
    .with_pattern(PathPattern::hive("kind/n:int").unwrap());
    let predicate = Expr::and(vec![
        Expr::in_list("kind", ["a", "c", "z"]),
        Expr::lt("n", 3i64),
    ]);
    let listed = table
        .scan()
        .with_predicate(predicate.clone())
        .collect_files()
        .await
        .unwrap();
    let generated = table
        .scan()
        .with_predicate(predicate)
        .generate_from_predicate(true)
        .collect_files()
        .await
        .unwrap();
    assert_eq!(names(&listed), vec!["kind=a/n=1/f.json"]);
    assert_eq!(listed, generated);
}

#[tokio::test]
async fn files_stream_is_lazy() {
    let table = memory_table(&["table/k=1/a.json", "table/k=2/b.json"]).await;
    let mut files = table.scan().files();
    let first = files.try_next().await.unwrap().unwrap();
    assert_eq!(first.file_name(), "a.json");
    drop(files);
}

#[tokio::test]
async fn predicate_generation_with_mixed_literal_types() {
    let table = memory_table(&["table/c=1/f.json", "table/c=2/f.json", "table/c=3/f.json"])
        .await
        .with_pattern(PathPattern::hive("c:int").unwrap());
    let predicate = Expr::and(vec![
        Expr::eq("c", "1"),
        Expr::in_list("c", [ScalarValue::Int64(Some(1)), ScalarValue::Int64(Some(3))]),
    ]);
    let listed = table
        .scan()
        .with_predicate(predicate.clone())
        .collect_files()
        .await
        .unwrap();
    let generated = table
        .scan()
        .with_predicate(predicate)
        .generate_from_predicate(true)
        .collect_files()
        .await
        .unwrap();
    assert_eq!(names(&listed), vec!["c=1/f.json"]);
    assert_eq!(listed, generated);

    let fractional = table
        .scan()
        .with_predicate(Expr::eq("c", 2.5f64))
        .generate_from_predicate(true)
        .collect_files()
        .await
        .unwrap();
    assert!(fractional.is_empty());
}
