use std::error::Error;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use traindag::dataset::{load_dataset, IMAGE_EXTENSIONS};

type TestResult = Result<(), Box<dyn Error>>;

fn touch(path: &Path) -> TestResult {
    fs::write(path, b"not really an image, discovery only checks names")?;
    Ok(())
}

#[test]
fn discovers_samples_per_class_directory() -> TestResult {
    let root = tempdir()?;
    let cats = root.path().join("cats");
    let dogs = root.path().join("dogs");
    fs::create_dir(&cats)?;
    fs::create_dir(&dogs)?;
    touch(&cats.join("a.png"))?;
    touch(&cats.join("b.jpg"))?;
    touch(&dogs.join("c.jpeg"))?;

    let samples = load_dataset(root.path())?;

    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].label, "cats");
    assert_eq!(samples[1].label, "cats");
    assert_eq!(samples[2].label, "dogs");
    assert!(samples[0].path.ends_with("cats/a.png"));
    Ok(())
}

#[test]
fn traversal_is_sorted_by_class_then_filename() -> TestResult {
    let root = tempdir()?;
    for class in ["zebra", "ant"] {
        fs::create_dir(root.path().join(class))?;
    }
    touch(&root.path().join("zebra").join("2.png"))?;
    touch(&root.path().join("zebra").join("1.png"))?;
    touch(&root.path().join("ant").join("9.png"))?;

    let samples = load_dataset(root.path())?;

    let names: Vec<String> = samples
        .iter()
        .map(|s| {
            format!(
                "{}/{}",
                s.label,
                s.path.file_name().unwrap().to_string_lossy()
            )
        })
        .collect();
    assert_eq!(names, ["ant/9.png", "zebra/1.png", "zebra/2.png"]);
    Ok(())
}

#[test]
fn extension_filter_is_case_insensitive() -> TestResult {
    let root = tempdir()?;
    let class = root.path().join("mixed");
    fs::create_dir(&class)?;
    touch(&class.join("upper.PNG"))?;
    touch(&class.join("camel.Jpg"))?;
    touch(&class.join("plain.bmp"))?;
    touch(&class.join("notes.txt"))?;
    touch(&class.join("archive.png.zip"))?;
    touch(&class.join("no_extension"))?;

    let samples = load_dataset(root.path())?;

    assert_eq!(samples.len(), 3);
    Ok(())
}

#[test]
fn loose_files_at_the_root_carry_no_label_and_are_skipped() -> TestResult {
    let root = tempdir()?;
    touch(&root.path().join("stray.png"))?;
    let class = root.path().join("cats");
    fs::create_dir(&class)?;
    touch(&class.join("a.png"))?;

    let samples = load_dataset(root.path())?;

    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].label, "cats");
    Ok(())
}

#[test]
fn nested_directories_inside_a_class_are_not_descended() -> TestResult {
    let root = tempdir()?;
    let class = root.path().join("cats");
    let nested = class.join("more");
    fs::create_dir_all(&nested)?;
    touch(&class.join("a.png"))?;
    touch(&nested.join("hidden.png"))?;

    let samples = load_dataset(root.path())?;

    assert_eq!(samples.len(), 1);
    Ok(())
}

#[test]
fn empty_tree_yields_an_empty_sample_list() -> TestResult {
    let root = tempdir()?;
    fs::create_dir(root.path().join("empty_class"))?;

    let samples = load_dataset(root.path())?;

    assert!(samples.is_empty());
    Ok(())
}

#[test]
fn missing_root_is_an_io_error() {
    let root = tempdir().unwrap();
    let gone = root.path().join("never_created");

    assert!(load_dataset(&gone).is_err());
}

#[test]
fn accepted_extensions_are_the_usual_raster_formats() {
    assert_eq!(IMAGE_EXTENSIONS, &["png", "jpg", "jpeg", "bmp"]);
}
