/// Example of partition discovery and pruning on a local directory tree.
///
/// This example shows how to:
/// 1. Describe a hive-partitioned layout with a typed pattern
/// 2. List only the files matching a predicate over partition columns
/// 3. Load those files into one Arrow batch with the partition columns attached
use std::{fs, path::Path};

use arrow::util::pretty::pretty_format_batches;
use fsql::{Expr, PathPattern, ReadOptions, RecordBatchReader, StoreConfig, Table};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Step 1: Lay out a small table
    //   year=2021/kind=click/part-0.csv
    //   year=2022/kind=click/part-0.csv
    //   year=2022/kind=view/part-0.csv
    //   year=2023/kind=view/part-0.csv
    let dir = tempfile::tempdir()?;
    for (year, kind, rows) in [
        (2021, "click", "user,n\na,1\nb,2\n"),
        (2022, "click", "user,n\nc,3\n"),
        (2022, "view", "user,n\nd,4\ne,5\n"),
        (2023, "view", "user,n\nf,6\n"),
    ] {
        write(dir.path(), &format!("year={year}/kind={kind}/part-0.csv"), rows)?;
    }

    // Step 2: Only year >= 2022 and kind = view can match, so year=2021 is never listed
    let table = Table::open(dir.path().to_str().unwrap_or_default(), &StoreConfig::new())?
        .with_pattern(PathPattern::hive("year:int/kind")?);
    let predicate = Expr::and(vec![Expr::gt_eq("year", 2022i64), Expr::eq("kind", "view")]);

    let files = table
        .scan()
        .with_predicate(predicate.clone())
        .collect_files()
        .await?;
    println!("Filter: {predicate}\n");
    for file in &files {
        println!("  {}", file.to_json()?);
    }

    // Step 3: Read them with the partition columns appended
    let outcome = table
        .scan()
        .with_predicate(predicate)
        .read(&RecordBatchReader::new(), &ReadOptions::default())
        .await?;
    println!("\n{}", pretty_format_batches(&[outcome.into_data()])?);
    Ok(())
}

fn write(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
