use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs
use tempfile;
use altairdsk::bios::geometry;
use altairdsk::fs::cpm::Disk;
use altairdsk::img::altair::AltairImage;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn mkdsk(path: &std::path::Path,fmt: &str) -> STDRESULT {
    Command::cargo_bin("altairdsk")?
        .arg("mkdsk").arg("-T").arg(fmt).arg("-d").arg(path)
        .assert()
        .success();
    Ok(())
}

#[test]
fn put_catalog_get() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("cpm.dsk");
    let src_path = dir.path().join("hello.txt");
    let out_path = dir.path().join("out.txt");
    std::fs::write(&src_path,"hello world\r\n")?;
    mkdsk(&dimg_path,"FDD_8IN")?;
    assert_eq!(std::fs::metadata(&dimg_path)?.len(),337568);
    Command::cargo_bin("altairdsk")?
        .arg("put").arg("-f").arg("hello.txt").arg("-i").arg(&src_path).arg("-d").arg(&dimg_path)
        .assert()
        .success();
    Command::cargo_bin("altairdsk")?
        .arg("catalog").arg("-d").arg(&dimg_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("HELLO    TXT"))
        .stdout(predicate::str::contains("1 file(s), occupying 2K of 296K total capacity"));
    Command::cargo_bin("altairdsk")?
        .arg("get").arg("-f").arg("HELLO.TXT").arg("-o").arg(&out_path).arg("-d").arg(&dimg_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(&out_path)?,b"hello world\r\n".to_vec());
    Ok(())
}

#[test]
fn delete_then_get_fails() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("tarbell.dsk");
    let src_path = dir.path().join("prog.com");
    std::fs::write(&src_path,vec![0xc3;1000])?;
    mkdsk(&dimg_path,"tarbell_fdd")?;
    Command::cargo_bin("altairdsk")?
        .arg("put").arg("-f").arg("prog.com").arg("-i").arg(&src_path).arg("-d").arg(&dimg_path)
        .assert()
        .success();
    Command::cargo_bin("altairdsk")?
        .arg("era").arg("-f").arg("PROG.COM").arg("-d").arg(&dimg_path)
        .assert()
        .success();
    Command::cargo_bin("altairdsk")?
        .arg("get").arg("-f").arg("PROG.COM").arg("-d").arg(&dimg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn mkdsk_will_not_overwrite() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("hdd.dsk");
    mkdsk(&dimg_path,"HDD_5MB")?;
    Command::cargo_bin("altairdsk")?
        .arg("mkdsk").arg("-T").arg("HDD_5MB").arg("-d").arg(&dimg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    Command::cargo_bin("altairdsk")?
        .arg("mkdsk").arg("-T").arg("HDD_5MB").arg("-d").arg(&dimg_path).arg("--force")
        .assert()
        .success();
    Ok(())
}

#[test]
fn stat_by_format() -> STDRESULT {
    Command::cargo_bin("altairdsk")?
        .arg("stat").arg("-T").arg("TARBELL_FDD").arg("--indent").arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sectors_per_track\": 26"));
    Ok(())
}

#[test]
fn unknown_image_length() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("odd.dsk");
    std::fs::write(&dimg_path,vec![0xe5;1000])?;
    Command::cargo_bin("altairdsk")?
        .arg("catalog").arg("-d").arg(&dimg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match any known format"));
    Ok(())
}

#[test]
fn rename_and_raw_listing() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("simh.dsk");
    let src_path = dir.path().join("data.bin");
    std::fs::write(&src_path,vec![0x41;3000])?;
    mkdsk(&dimg_path,"SIMH_FDD_8IN")?;
    Command::cargo_bin("altairdsk")?
        .arg("put").arg("-f").arg("data.bin").arg("-i").arg(&src_path).arg("-d").arg(&dimg_path)
        .assert()
        .success();
    Command::cargo_bin("altairdsk")?
        .arg("rename").arg("-f").arg("DATA.BIN").arg("-n").arg("new.bin").arg("-d").arg(&dimg_path)
        .assert()
        .success();
    Command::cargo_bin("altairdsk")?
        .arg("raw").arg("-d").arg(&dimg_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(":NEW     :BIN:"))
        .stdout(predicate::str::contains("FREE ALLOCATIONS:"));
    Ok(())
}

#[test]
fn mput_keeps_files_before_failure() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("cpm.dsk");
    let good_path = dir.path().join("good.txt");
    let missing_path = dir.path().join("missing.txt");
    std::fs::write(&good_path,"good\r\n")?;
    mkdsk(&dimg_path,"FDD_8IN")?;
    Command::cargo_bin("altairdsk")?
        .arg("mput").arg("-i").arg(&good_path).arg(&missing_path).arg("-d").arg(&dimg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
    Command::cargo_bin("altairdsk")?
        .arg("catalog").arg("-d").arg(&dimg_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("GOOD     TXT"))
        .stdout(predicate::str::contains("1 file(s)"));
    Ok(())
}

#[test]
fn mget_stays_in_its_directory() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let dimg_path = dir.path().join("cpm.dsk");
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir)?;
    let mut disk = Disk::format(geometry::FDD_8IN)?;
    disk.write_file("QQQQQQ.TXT",b"escape\r\n",None)?;
    disk.write_file("SAFE.TXT",b"safe\r\n",None)?;
    let mut img = disk.to_bytes();
    // the first directory entry holds QQQQQQ.TXT, give it a name with a path in it
    let entry = AltairImage::create(geometry::FDD_8IN)?.locate(0,0).offset;
    assert_eq!(&img[entry+1..entry+7],b"QQQQQQ");
    img[entry+1..entry+7].copy_from_slice(b"../ESC");
    std::fs::write(&dimg_path,&img)?;
    Command::cargo_bin("altairdsk")?
        .arg("mget").arg("-f").arg("*").arg("--dir").arg(&out_dir).arg("-d").arg(&dimg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a plain file name"));
    assert!(!dir.path().join("ESC.TXT").exists());
    assert_eq!(std::fs::read(out_dir.join("SAFE.TXT"))?,b"safe\r\n".to_vec());
    Ok(())
}
