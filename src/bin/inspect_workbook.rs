use calamine::{open_workbook, Reader, Xlsx};
use fsconsolidate::{
    normalize::{drop_blank_codes, project_accounts},
    sheet::{extract_block, find_anchor_row, read_sheet, ANCHOR_LABEL},
};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect a workbook path and optionally the sheet to look at.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        let prog = args.first().map_or("inspect_workbook", String::as_str);
        eprintln!("Usage: {} <XLSX_FILE> [SHEET]", prog);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1]), args.get(2).map(String::as_str)) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

/// Print the sheets of a workbook and what the pipeline would make of one of them.
fn inspect(path: &Path, sheet: Option<&str>) -> anyhow::Result<()> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    let names = workbook.sheet_names();
    println!("=== Workbook: {} ===", path.display());
    println!("Sheets: {}", names.join(", "));

    let Some(sheet) = sheet.map(str::to_string).or_else(|| names.first().cloned()) else {
        println!("no sheets");
        return Ok(());
    };

    let grid = read_sheet(path, &sheet).map_err(|r| anyhow::anyhow!("{}", r))?;
    println!();
    println!("=== Sheet: {} ===", sheet);
    println!("First used row:  {}", grid.first_row);
    println!("Rows:            {}", grid.rows.len());

    match find_anchor_row(&grid.rows, ANCHOR_LABEL) {
        Some(i) => println!("Anchor row:      {}", grid.first_row as usize + i),
        None => {
            println!("Anchor row:      <missing>");
            return Ok(());
        }
    }

    let block = extract_block(&grid, ANCHOR_LABEL).map_err(|r| anyhow::anyhow!("{}", r))?;
    println!("Headers:         {}", block.headers.join(" | "));
    match project_accounts(&block) {
        Ok(lines) => {
            let total = lines.len();
            let kept = drop_blank_codes(lines);
            println!("Data rows:       {} ({} with account code)", total, kept.len());
            for l in kept.iter().take(5) {
                println!(
                    "  {:<12} {:<40} {}",
                    l.acc_code.to_string(),
                    l.acc_name.to_string(),
                    l.accum_month_amnt
                );
            }
        }
        Err(reason) => println!("Would skip:      {}", reason),
    }
    Ok(())
}
