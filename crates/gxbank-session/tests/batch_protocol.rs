// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use gxbank_core::asset::{TextureBank, TextureFormat, TextureSlot};
use gxbank_core::codec::ContainerCodec;
use gxbank_core::{EditorSettings, Game};
use gxbank_lanes::container_lane::TplCodec;
use gxbank_lanes::texture_lane::MipChainLane;
use gxbank_session::{Dispatcher, Session};
use image::{Rgba, RgbaImage};
use std::path::Path;

const SUCCESS: &str = "Command completed successfully";

fn run(session: &mut Session, args: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    Dispatcher::new()
        .run_batch(session, args, &mut out)
        .expect("writing to a Vec cannot fail");
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn write_tpl(path: &Path, game: Game) {
    let image = RgbaImage::from_fn(32, 32, |x, y| Rgba([(x * 8) as u8, (y * 8) as u8, 0, 255]));
    let bank = TextureBank::from_slots(vec![
        MipChainLane::default()
            .generate(&image, TextureFormat::Cmpr)
            .unwrap(),
        TextureSlot::empty(),
    ]);
    let mut file = std::fs::File::create(path).unwrap();
    TplCodec.encode(&bank, game, &mut file).unwrap();
}

#[test]
fn full_texture_pipeline_runs_as_one_batch() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.tpl");
    let target = dir.path().join("target.tpl");
    let pngs = dir.path().join("pngs");
    write_tpl(&source, Game::Deluxe);

    let mut session = Session::new(EditorSettings::default());
    let lines = run(
        &mut session,
        &[
            "-game",
            "deluxe",
            "-importTpl",
            source.to_str().unwrap(),
            "-setAllMipmaps",
            "2",
            "-exportTpl",
            target.to_str().unwrap(),
            "-exportPng",
            pngs.to_str().unwrap(),
        ],
    );

    assert_eq!(lines.len(), 5, "{lines:?}");
    assert!(lines.iter().all(|line| line.ends_with(SUCCESS)), "{lines:?}");
    assert!(!session.textures_dirty());

    let mut reloaded = Session::default();
    reloaded.set_selected_game(Game::Deluxe);
    reloaded.load_textures(Some(&target)).unwrap();
    let bank = reloaded.textures().unwrap();
    assert_eq!(bank.len(), 2);
    assert_eq!(bank.slot(0).unwrap().levels().len(), 3);
    assert!(bank.slot(1).unwrap().is_empty());

    for level in 0..3 {
        assert!(pngs.join(format!("tex_000_mip_{level}.png")).is_file());
    }
    assert!(!pngs.join("tex_000_mip_3.png").exists());
}

#[test]
fn wrong_game_fails_the_import_and_leaves_no_bank() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.tpl");
    write_tpl(&source, Game::Smb);

    let mut session = Session::default();
    let lines = run(
        &mut session,
        &["-game", "deluxe", "-importTpl", source.to_str().unwrap()],
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Invalid Command Error [-importTpl]: "));
    assert!(session.textures().is_none());
}

#[test]
fn exports_without_banks_report_errors() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let out = out.to_str().unwrap();

    let mut session = Session::default();
    let lines = run(
        &mut session,
        &["-exportTpl", out, "-exportGma", out, "-exportObjMtl", out, "-exportPng", out],
    );
    assert_eq!(lines.len(), 4);
    for (line, command) in lines
        .iter()
        .zip(["-exportTpl", "-exportGma", "-exportObjMtl", "-exportPng"])
    {
        assert!(
            line.starts_with(&format!("Invalid Command Error [{command}]: No ")),
            "{line}"
        );
    }
}

#[test]
fn batch_then_interactive() {
    let mut session = Session::default();
    let dispatcher = Dispatcher::new();
    let mut out = Vec::new();

    let outcome = dispatcher
        .run_batch(&mut session, &["-interactive", "-mipmaps", "4"], &mut out)
        .unwrap();
    assert!(outcome.enter_interactive);

    dispatcher
        .run_interactive(
            &mut session,
            "-interpolate nearest -interHelp\n-quit\n-mipmaps 1\n".as_bytes(),
            &mut out,
        )
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Interactive mode"));
    let outcomes: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("Info [") || line.starts_with("Invalid Command Error ["))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            "Info [-interactive]: Command completed successfully",
            "Info [-mipmaps]: Command completed successfully",
            "Info [-interpolate]: Command completed successfully",
            "Info [-interHelp]: Command completed successfully",
            "Info [-quit]: Command completed successfully",
        ]
    );
    assert_eq!(session.settings().mipmap_count, Some(4));
}
