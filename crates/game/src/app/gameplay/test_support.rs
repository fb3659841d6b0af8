use std::cell::RefCell;
use std::rc::Rc;

use engine::{parse_tmx, AssetStore, BitmapFont, RecordingAudio, SharedAudio, Sprite, Tilemap};
use tempfile::TempDir;

use super::save::SaveStore;
use super::session::GameResources;
use super::settings::PlayerSettings;

pub(crate) const MAP_WIDTH: usize = 40;
pub(crate) const MAP_HEIGHT: usize = 12;
/// Floor row; its top edge sits at y = 128.
pub(crate) const FLOOR_ROW: usize = 8;
pub(crate) const GAP_COLUMNS: std::ops::Range<usize> = 24..27;
pub(crate) const FLOOR_TOP: f32 = 128.0;
pub(crate) const PLAYER_SIZE: (u32, u32) = (10, 16);

fn ground_csv() -> String {
    let mut rows = Vec::with_capacity(MAP_HEIGHT);
    for row in 0..MAP_HEIGHT {
        let cells: Vec<&str> = (0..MAP_WIDTH)
            .map(|column| {
                if row == FLOOR_ROW && !GAP_COLUMNS.contains(&column) {
                    "1"
                } else {
                    "0"
                }
            })
            .collect();
        rows.push(cells.join(","));
    }
    rows.join(",\n")
}

pub(crate) fn map_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="{MAP_WIDTH}" height="{MAP_HEIGHT}" tilewidth="16" tileheight="16">
 <tileset firstgid="1" source="tiles.tsx"/>
 <layer id="1" name="ground" width="{MAP_WIDTH}" height="{MAP_HEIGHT}">
  <data encoding="csv">
{csv}
</data>
 </layer>
 <objectgroup id="2" name="npcs">
  <object id="1" name="crab" type="quest_giver_npc" x="96" y="112" width="16" height="16">
   <properties>
    <property name="item" value="shell_key"/>
    <property name="text">I lost my key.

Bring it to the gull.</property>
    <property name="text_if_item">Thank you!</property>
   </properties>
  </object>
  <object id="2" name="gull" type="quest_receiver_npc" x="160" y="112" width="16" height="16">
   <properties>
    <property name="item" value="shell_key"/>
    <property name="text">Have you seen a key?</property>
    <property name="text_if_item">A key! Take this seashell.</property>
   </properties>
  </object>
  <object id="3" name="bucket" type="item_npc" x="200" y="120" width="8" height="8">
   <properties>
    <property name="item" value="bucket"/>
   </properties>
  </object>
 </objectgroup>
 <objectgroup id="3" name="checkpoints">
  <object id="4" x="128" y="64" width="8" height="64"/>
 </objectgroup>
</map>
"#,
        csv = ground_csv()
    )
}

pub(crate) fn tilemap() -> Tilemap {
    parse_tmx(&map_xml()).expect("test map")
}

/// Every sprite the game stages look up, as flat colour blocks.
pub(crate) fn assets() -> AssetStore {
    let sheet = Sprite::solid(64, 36, [255; 4]);
    let font = BitmapFont::new(sheet, 4, 6, ' ').expect("font");
    let (player_w, player_h) = PLAYER_SIZE;
    let mut store = AssetStore::new(font)
        .with_frames("player_idle", vec![Sprite::solid(player_w, player_h, [1, 1, 1, 255])])
        .with_frames("player_walk", vec![Sprite::solid(player_w, player_h, [2, 2, 2, 255]); 4])
        .with_frames("player_jump", vec![Sprite::solid(player_w, player_h, [3, 3, 3, 255])])
        .with_frames("bucket", vec![Sprite::solid(8, 8, [4, 4, 4, 255])])
        .with_frames("exclamation", vec![Sprite::solid(4, 8, [5, 5, 5, 255])])
        .with_frames("seashell", vec![Sprite::solid(8, 8, [6, 6, 6, 255])])
        .with_frames("tileset", vec![Sprite::solid(32, 16, [7, 7, 7, 255])]);
    for npc in ["crab", "gull"] {
        store = store
            .with_frames(format!("{npc}_idle"), vec![Sprite::solid(16, 16, [8, 8, 8, 255]); 2])
            .with_frames(format!("{npc}_talk"), vec![Sprite::solid(16, 16, [9, 9, 9, 255]); 2]);
    }
    for layer in 0..6 {
        store = store.with_frames(
            format!("bg{layer}"),
            vec![Sprite::solid(320, 180, [10, 10, 10, 255])],
        );
    }
    for sound in ["quest_give", "quest_receive", "pickup", "grey"] {
        store = store.with_sound(sound);
    }
    store.with_music("ost").with_music("ost_quiet")
}

/// Resources backed by a temporary save directory and a recording sink.
pub(crate) struct TestGame {
    _dir: TempDir,
    pub(crate) audio: Rc<RefCell<RecordingAudio>>,
    pub(crate) resources: GameResources,
}

impl TestGame {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let shared: SharedAudio = audio.clone();
        let resources = GameResources {
            assets: Rc::new(assets()),
            tilemap: Rc::new(tilemap()),
            audio: shared,
            saves: SaveStore::new(dir.path()),
            viewport: (320, 180),
        };
        Self {
            _dir: dir,
            audio,
            resources,
        }
    }

    pub(crate) fn with_settings(self, settings: &PlayerSettings) -> Self {
        self.resources
            .saves
            .write_settings(settings)
            .expect("write settings");
        self
    }

    pub(crate) fn saved_settings(&self) -> Option<PlayerSettings> {
        self.resources
            .saves
            .player_path()
            .exists()
            .then(|| self.resources.saves.load_settings().expect("load settings"))
    }
}
